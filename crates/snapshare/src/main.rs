mod options;
mod report;

use anyhow::Context;
use clap::Parser;
use options::{RunOptions, TuningArgs};
use report::ConsoleReporter;
use snapshare_cloud::{SharePipeline, ShareRequest};
use snapshare_cloud_aws::RdsSnapshotProvider;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "warn,snapshare=info,snapshare_cloud=info,snapshare_cloud_aws=info";

#[derive(Parser)]
#[command(name = "snapshare", version)]
#[command(
    about = "RDS スナップショットを取得し、KMS キーで再暗号化したコピーを別アカウントに共有",
    long_about = None
)]
struct Cli {
    /// スナップショットを取得する DB インスタンス ID
    db_instance_id: String,

    /// コピーの暗号化に使う KMS キー ID または ARN
    kms_key_id: String,

    /// restore 権限を付与する AWS アカウント ID
    destination_account_id: String,

    #[command(flatten)]
    tuning: TuningArgs,
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    // 標準出力は進捗表示に使うので、ログは標準エラーへ
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let settings = snapshare_config::load_settings(cli.tuning.config.as_deref())
        .context("設定ファイルを読み込めませんでした")?;
    let options = RunOptions::resolve(&cli.tuning, &settings)?;
    tracing::debug!(?options, "resolved run options");

    let provider = RdsSnapshotProvider::from_env(&options.aws).await;
    let request = ShareRequest::new(
        cli.db_instance_id,
        cli.kms_key_id,
        cli.destination_account_id,
    );

    let reporter = ConsoleReporter::new();
    let report = SharePipeline::new(&provider, options.pipeline)
        .with_observer(&reporter)
        .run(&request)
        .await;

    reporter.print_summary(&request, &report);

    // 中断や共有失敗は終了コードに反映しない（出力で通知する）
    if report.is_aborted() {
        tracing::warn!(state = ?report.state, "pipeline aborted");
    }
    Ok(())
}
