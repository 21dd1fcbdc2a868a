use std::sync::LazyLock;

use derive_from_env::FromEnv;

/// Settings read from `TRANLOG_*` environment variables. Empty means unset.
#[derive(FromEnv)]
#[from_env(prefix = "TRANLOG")]
#[allow(non_snake_case)]
pub struct TranLogEnv {
    #[from_env(default = "")]
    pub LOG_ROOT: String,
    #[from_env(default = "")]
    pub LOG_FILE_NAME: String,
    #[from_env(default = "")]
    pub DATE_PREFIX_LOGFILE: String,
    #[from_env(default = "")]
    pub SETTINGS_FILE: String,
}

pub static TRANLOG_ENV: LazyLock<Result<TranLogEnv, String>> =
    LazyLock::new(|| TranLogEnv::from_env().map_err(|e| format!("{e:?}")));
