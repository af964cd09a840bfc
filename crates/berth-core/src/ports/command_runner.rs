//! CommandRunner port - 外部コマンド実行の抽象化
//!
//! requirements の再生成で使う。テストでは偽の runner に差し替える。

use async_trait::async_trait;

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with status {status:?}: {stderr}")]
    Failed {
        program: String,
        status: Option<i32>,
        stderr: String,
    },
}

/// Runs one external command to completion.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run `program` with `args` and return its stdout. A non-zero exit is an error.
    async fn run(&self, program: &str, args: &[String]) -> Result<String, CommandError>;
}
