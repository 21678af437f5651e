//! Route paths and fixed response texts.

/// Data-only submission (JSON body)
pub const SUBMIT_PATH: &str = "/enviar";

/// Submission with media (multipart form)
pub const SHARE_PATH: &str = "/compartilhar";

pub const HEALTH_PATH: &str = "/health";

/// Multipart field carrying the guest's files
pub const FILES_FIELD: &str = "arquivos";

pub const SUBMIT_OK_MESSAGE: &str = "Dados enviados e armazenados com sucesso!";

pub const SHARE_OK_MESSAGE: &str = "Fotos e vídeos enviados com sucesso!";
