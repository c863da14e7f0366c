use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct DaemonConfig {
    pub listen: String,
    pub db_dir: PathBuf,
}
