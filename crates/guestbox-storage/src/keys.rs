//! Shared object naming for storage backends.
//!
//! Object ids have the form `{container_id}/{object_name}`.

use crate::traits::{StorageError, StorageResult};
use uuid::Uuid;

/// Name of the per-container metadata object; never used for guest files.
pub const CONTAINER_METADATA: &str = ".container.json";

/// Directory holding per-object metadata in local containers.
pub const OBJECT_METADATA_DIR: &str = ".objects";

/// Names the backends keep for themselves.
pub fn is_reserved(name: &str) -> bool {
    name == CONTAINER_METADATA || name == OBJECT_METADATA_DIR
}

/// Final path component of a submitted filename, accepting both `/` and `\`.
pub fn file_leaf(filename: &str) -> &str {
    filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(filename)
}

/// Object name under which a submitted file is stored. The leaf is kept
/// as submitted; only blank leaves are rejected.
pub fn object_name(filename: &str) -> StorageResult<String> {
    let leaf = file_leaf(filename);
    if leaf.trim().is_empty() || leaf == "." || leaf == ".." || leaf.contains('\0') {
        return Err(StorageError::InvalidKey(format!(
            "Unusable object name: {:?}",
            filename
        )));
    }
    Ok(leaf.to_string())
}

/// Container ids are UUIDs generated by the backend; anything else is rejected
/// before it reaches a path or key.
pub fn validate_container_id(container_id: &str) -> StorageResult<()> {
    Uuid::parse_str(container_id)
        .map(|_| ())
        .map_err(|_| StorageError::InvalidKey(format!("Invalid container id: {}", container_id)))
}

pub fn object_id(container_id: &str, object_name: &str) -> String {
    format!("{}/{}", container_id, object_name)
}

/// Split an object id into (container_id, object_name) and validate both parts.
pub fn split_object_id(object_id: &str) -> StorageResult<(&str, &str)> {
    let (container_id, name) = object_id
        .split_once('/')
        .ok_or_else(|| StorageError::InvalidKey(format!("Invalid object id: {}", object_id)))?;
    validate_container_id(container_id)?;
    if name != object_name(name)? {
        return Err(StorageError::InvalidKey(format!(
            "Invalid object id: {}",
            object_id
        )));
    }
    Ok((container_id, name))
}

/// `name` with ` (n)` inserted before the extension, as file browsers do.
pub fn numbered_name(name: &str, n: u32) -> String {
    match name.rfind('.') {
        Some(idx) if idx > 0 => format!("{} ({}){}", &name[..idx], n, &name[idx..]),
        _ => format!("{} ({})", name, n),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leaf_strips_both_separators() {
        assert_eq!(file_leaf("foto 1.jpg"), "foto 1.jpg");
        assert_eq!(file_leaf("a/b/foto.jpg"), "foto.jpg");
        assert_eq!(file_leaf("C:\\fakepath\\foto.jpg"), "foto.jpg");
    }

    #[test]
    fn object_name_keeps_spaces_and_rejects_traversal() {
        assert_eq!(object_name("foto 1.jpg").unwrap(), "foto 1.jpg");
        assert_eq!(object_name("../../etc/passwd").unwrap(), "passwd");
        assert!(object_name("..").is_err());
        assert!(object_name("dir/").is_err());
        assert!(object_name("   ").is_err());
    }

    #[test]
    fn object_name_keeps_surrounding_whitespace() {
        assert_eq!(object_name("foto.jpg ").unwrap(), "foto.jpg ");
        assert_eq!(object_name("dir/ foto.jpg").unwrap(), " foto.jpg");
    }

    #[test]
    fn reserved_names() {
        assert!(is_reserved(CONTAINER_METADATA));
        assert!(is_reserved(OBJECT_METADATA_DIR));
        assert!(!is_reserved("foto.jpg"));
    }

    #[test]
    fn object_ids_round_trip() {
        let container = Uuid::new_v4().to_string();
        let id = object_id(&container, "foto 1.jpg");
        let (c, n) = split_object_id(&id).unwrap();
        assert_eq!(c, container);
        assert_eq!(n, "foto 1.jpg");
    }

    #[test]
    fn split_rejects_foreign_ids() {
        assert!(split_object_id("not-a-uuid/foto.jpg").is_err());
        assert!(split_object_id("nofolder").is_err());
        let container = Uuid::new_v4().to_string();
        assert!(split_object_id(&format!("{}/../x", container)).is_err());
    }

    #[test]
    fn numbered_names_keep_extension() {
        assert_eq!(numbered_name("foto.jpg", 1), "foto (1).jpg");
        assert_eq!(numbered_name("README", 2), "README (2)");
        assert_eq!(numbered_name(".hidden", 1), ".hidden (1)");
    }
}
