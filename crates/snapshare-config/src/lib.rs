pub mod error;

pub use error::*;

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// 設定ファイルのパスを直接指定する環境変数
pub const CONFIG_PATH_ENV: &str = "SNAPSHARE_CONFIG_PATH";

const CONFIG_FILE_NAME: &str = "config.yaml";

/// snapshare の設定 (すべて省略可能)
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// AWS リージョン
    pub region: Option<String>,
    /// AWS 共有設定のプロファイル名
    pub profile: Option<String>,
    pub polling: PollingSettings,
    /// copy 完了から share までの待機秒数
    pub settle_delay_secs: Option<u64>,
}

/// available 待ちのポーリング設定
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PollingSettings {
    pub interval_secs: Option<u64>,
    pub max_attempts: Option<u32>,
    /// Exponential倍率 (1.0 で固定間隔)
    pub multiplier: Option<f64>,
    pub max_interval_secs: Option<u64>,
}

impl Settings {
    /// YAML 文字列から読み込む
    pub fn from_yaml(content: &str, path: &Path) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let settings: Settings =
            serde_yaml::from_str(content).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if self.polling.interval_secs == Some(0) {
            return Err(ConfigError::Invalid(
                "polling.interval_secs は 1 以上を指定してください".to_string(),
            ));
        }
        if self.polling.max_attempts == Some(0) {
            return Err(ConfigError::Invalid(
                "polling.max_attempts は 1 以上を指定してください".to_string(),
            ));
        }
        if let Some(multiplier) = self.polling.multiplier {
            if !(multiplier.is_finite() && multiplier >= 1.0) {
                return Err(ConfigError::Invalid(format!(
                    "polling.multiplier は 1.0 以上を指定してください (指定値: {})",
                    multiplier
                )));
            }
        }
        Ok(())
    }
}

/// snapshare の設定ディレクトリ (~/.config/snapshare など)
pub fn get_config_dir() -> Result<PathBuf> {
    let config_dir = dirs::config_dir()
        .ok_or(ConfigError::ConfigDirNotFound)?
        .join("snapshare");
    Ok(config_dir)
}

/// 設定ファイルを探す
///
/// 以下の優先順位で検索:
/// 1. 引数で明示されたパス (--config)
/// 2. 環境変数 SNAPSHARE_CONFIG_PATH
/// 3. ~/.config/snapshare/config.yaml
///
/// 1, 2 で指定したファイルが存在しない場合はエラー。
/// 3 が存在しない場合は `Ok(None)`。
pub fn find_config_file(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
    let requested = explicit
        .map(Path::to_path_buf)
        .or_else(|| std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from));

    if let Some(path) = requested {
        if path.is_file() {
            return Ok(Some(path));
        }
        return Err(ConfigError::ConfigFileNotFound(path));
    }

    let Ok(config_dir) = get_config_dir() else {
        return Ok(None);
    };
    let default_path = config_dir.join(CONFIG_FILE_NAME);
    Ok(default_path.is_file().then_some(default_path))
}

/// 設定を読み込む。設定ファイルが無ければデフォルト値
pub fn load_settings(explicit: Option<&Path>) -> Result<Settings> {
    match find_config_file(explicit)? {
        Some(path) => {
            let content = std::fs::read_to_string(&path)?;
            Settings::from_yaml(&content, &path)
        }
        None => Ok(Settings::default()),
    }
}
