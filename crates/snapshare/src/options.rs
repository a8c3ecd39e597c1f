//! 実行オプションの解決
//!
//! 優先順位: CLI フラグ / 環境変数 > 設定ファイル > デフォルト値

use anyhow::Context;
use clap::Args;
use snapshare_cloud::{PipelineConfig, PollPolicy};
use snapshare_cloud_aws::AwsOptions;
use snapshare_config::Settings;
use std::path::PathBuf;
use std::time::Duration;

/// 接続先とポーリングの調整用フラグ
#[derive(Args, Debug, Default, Clone)]
pub struct TuningArgs {
    /// AWS リージョン
    #[arg(long, env = "AWS_REGION")]
    pub region: Option<String>,

    /// AWS 共有設定のプロファイル名
    #[arg(long, env = "AWS_PROFILE")]
    pub profile: Option<String>,

    /// available 確認の間隔（秒）
    #[arg(
        long,
        env = "SNAPSHARE_POLL_INTERVAL",
        value_name = "SECS",
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub poll_interval: Option<u64>,

    /// available 確認の最大回数
    #[arg(
        long,
        env = "SNAPSHARE_MAX_ATTEMPTS",
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub max_attempts: Option<u32>,

    /// 確認間隔の倍率（1.0 で固定間隔）
    #[arg(long, env = "SNAPSHARE_BACKOFF", value_name = "MULTIPLIER")]
    pub backoff: Option<f64>,

    /// copy 完了から share までの待機時間（秒）
    #[arg(long, env = "SNAPSHARE_SETTLE_DELAY", value_name = "SECS")]
    pub settle_delay: Option<u64>,

    /// 設定ファイルのパス（省略時は SNAPSHARE_CONFIG_PATH、~/.config/snapshare/config.yaml）
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

/// 解決済みの実行オプション
#[derive(Debug, Clone, PartialEq)]
pub struct RunOptions {
    pub aws: AwsOptions,
    pub pipeline: PipelineConfig,
}

impl RunOptions {
    pub fn resolve(args: &TuningArgs, settings: &Settings) -> anyhow::Result<Self> {
        let defaults = PipelineConfig::default();
        let polling = &settings.polling;

        let interval = args
            .poll_interval
            .or(polling.interval_secs)
            .map(Duration::from_secs)
            .unwrap_or(defaults.poll.interval);
        let max_attempts = args
            .max_attempts
            .or(polling.max_attempts)
            .unwrap_or(defaults.poll.max_attempts);
        let multiplier = args
            .backoff
            .or(polling.multiplier)
            .unwrap_or(defaults.poll.multiplier);
        let max_interval = polling
            .max_interval_secs
            .map(Duration::from_secs)
            .unwrap_or(defaults.poll.max_interval);

        let poll = PollPolicy::fixed(interval, max_attempts).with_backoff(multiplier, max_interval);
        poll.validate().context("ポーリング設定が不正です")?;

        let settle_delay = args
            .settle_delay
            .or(settings.settle_delay_secs)
            .map(Duration::from_secs)
            .unwrap_or(defaults.settle_delay);

        Ok(Self {
            aws: AwsOptions {
                region: args.region.clone().or_else(|| settings.region.clone()),
                profile: args.profile.clone().or_else(|| settings.profile.clone()),
            },
            pipeline: PipelineConfig { poll, settle_delay },
        })
    }
}
