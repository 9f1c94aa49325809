//! Stockfish engine session — UCI over child-process pipes (async I/O).

use std::future::Future;
use std::process::Stdio;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::time::timeout;
use tracing::debug;

use review_core::{PositionEval, Score};

use crate::error::EngineError;

/// Configuration for spawning engine sessions.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Path to the engine binary.
    pub path: String,
    pub threads: u32,
    pub hash_mb: u32,
    /// Bound on a single `evaluate` call.
    pub eval_timeout: Duration,
    /// Bound on process spawn plus UCI handshake.
    pub startup_timeout: Duration,
    /// Bound on recovering a dangling search (stop, drain, readyok).
    pub resync_timeout: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            path: "/usr/local/bin/stockfish".to_string(),
            threads: 1,
            hash_mb: 256,
            eval_timeout: Duration::from_secs(20),
            startup_timeout: Duration::from_secs(10),
            resync_timeout: Duration::from_secs(5),
        }
    }
}

/// One engine process, narrowed to the two operations the analyzer needs.
/// The seam that lets tests run against a deterministic fake.
pub trait EngineSession: Send + 'static {
    /// Evaluate one position to the given depth. Blocks the caller until
    /// the engine answers or the per-call timeout elapses.
    fn evaluate(
        &mut self,
        fen: &str,
        depth: u32,
    ) -> impl Future<Output = Result<PositionEval, EngineError>> + Send;

    /// Orderly shutdown, releasing the underlying resource.
    fn shutdown(&mut self) -> impl Future<Output = ()> + Send;
}

/// A live Stockfish process speaking UCI.
pub struct StockfishSession {
    process: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
    eval_timeout: Duration,
    resync_timeout: Duration,
    /// A `go` was issued whose `bestmove` has not been consumed yet
    /// (timed-out or cancelled call). The next search must resync first.
    mid_search: bool,
}

impl StockfishSession {
    /// Spawn the engine process and run the UCI handshake.
    pub async fn spawn(config: &EngineConfig) -> Result<Self, EngineError> {
        let mut process = Command::new(&config.path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| {
                EngineError::Unavailable(format!("failed to spawn {}: {e}", config.path))
            })?;

        let stdin = process
            .stdin
            .take()
            .ok_or_else(|| EngineError::Unavailable("engine stdin missing".into()))?;
        let stdout = process
            .stdout
            .take()
            .ok_or_else(|| EngineError::Unavailable("engine stdout missing".into()))?;

        let mut session = Self {
            process,
            stdin,
            stdout: BufReader::new(stdout),
            eval_timeout: config.eval_timeout,
            resync_timeout: config.resync_timeout,
            mid_search: false,
        };

        match timeout(config.startup_timeout, session.init(config)).await {
            Ok(Ok(())) => Ok(session),
            Ok(Err(e)) => Err(EngineError::Unavailable(e.to_string())),
            Err(_) => Err(EngineError::Unavailable("UCI handshake timed out".into())),
        }
    }

    async fn init(&mut self, config: &EngineConfig) -> Result<(), EngineError> {
        self.send("uci").await?;
        self.wait_for("uciok").await?;

        self.send(&format!("setoption name Threads value {}", config.threads))
            .await?;
        self.send(&format!("setoption name Hash value {}", config.hash_mb))
            .await?;
        self.send("setoption name UCI_AnalyseMode value true").await?;
        self.send("isready").await?;
        self.wait_for("readyok").await?;
        Ok(())
    }

    async fn send(&mut self, cmd: &str) -> Result<(), EngineError> {
        debug!(cmd, "engine <");
        self.stdin
            .write_all(format!("{cmd}\n").as_bytes())
            .await
            .map_err(|e| EngineError::Crashed(format!("write to engine failed: {e}")))?;
        self.stdin
            .flush()
            .await
            .map_err(|e| EngineError::Crashed(format!("flush to engine failed: {e}")))?;
        Ok(())
    }

    async fn read_line(&mut self) -> Result<String, EngineError> {
        let mut line = String::new();
        let bytes = self
            .stdout
            .read_line(&mut line)
            .await
            .map_err(|e| EngineError::Crashed(format!("read from engine failed: {e}")))?;
        if bytes == 0 {
            return Err(EngineError::Crashed("engine closed its pipe".into()));
        }
        let trimmed = line.trim().to_string();
        debug!(line = %trimmed, "engine >");
        Ok(trimmed)
    }

    async fn wait_for(&mut self, expected: &str) -> Result<(), EngineError> {
        loop {
            if self.read_line().await? == expected {
                return Ok(());
            }
        }
    }

    /// Drain a search left dangling by a timed-out or cancelled call so the
    /// next `position`/`go` pair starts from a clean protocol state. The
    /// whole recovery, drain included, is bounded by the resync timeout.
    async fn resync(&mut self) -> Result<(), EngineError> {
        self.send("stop").await?;

        let resync_timeout = self.resync_timeout;
        let recover = async {
            loop {
                if self.read_line().await?.starts_with("bestmove") {
                    break;
                }
            }
            self.mid_search = false;
            self.send("isready").await?;
            self.wait_for("readyok").await?;
            Ok::<_, EngineError>(())
        };
        timeout(resync_timeout, recover)
            .await
            .map_err(|_| EngineError::Crashed("engine did not recover after stop".into()))??;
        Ok(())
    }

    async fn run_search(&mut self, fen: &str, depth: u32) -> Result<PositionEval, EngineError> {
        self.send(&format!("position fen {fen}")).await?;
        self.send(&format!("go depth {depth}")).await?;
        self.mid_search = true;

        let mut score: Option<Score> = None;
        let mut depth_reached: u32 = 0;

        loop {
            let line = self.read_line().await?;
            if line.starts_with("info ") {
                if let Some(s) = parse_score(&line) {
                    score = Some(s);
                }
                if let Some(d) = parse_depth(&line) {
                    depth_reached = d;
                }
            } else if let Some(rest) = line.strip_prefix("bestmove") {
                self.mid_search = false;
                let best_move = rest
                    .split_whitespace()
                    .next()
                    .filter(|m| *m != "(none)")
                    .map(str::to_string);
                return Ok(PositionEval {
                    score: score.unwrap_or(Score::Cp(0)),
                    best_move,
                    depth: depth_reached,
                });
            }
        }
    }
}

impl EngineSession for StockfishSession {
    async fn evaluate(&mut self, fen: &str, depth: u32) -> Result<PositionEval, EngineError> {
        if self.mid_search {
            self.resync().await?;
        }

        match timeout(self.eval_timeout, self.run_search(fen, depth)).await {
            Ok(result) => result,
            Err(_) => {
                // Salvage the session if the engine still answers `stop`.
                match self.resync().await {
                    Ok(()) => Err(EngineError::Timeout),
                    Err(_) => Err(EngineError::Crashed(
                        "engine unresponsive after evaluation timeout".into(),
                    )),
                }
            }
        }
    }

    async fn shutdown(&mut self) {
        let _ = self.send("quit").await;
        let _ = self.process.wait().await;
    }
}

impl Drop for StockfishSession {
    fn drop(&mut self) {
        // Best-effort synchronous kill in drop.
        let _ = self.process.start_kill();
    }
}

/// Parse `score cp N` or `score mate N` from a UCI info line.
fn parse_score(line: &str) -> Option<Score> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    for (i, part) in parts.iter().enumerate() {
        if *part != "score" {
            continue;
        }
        return match (parts.get(i + 1), parts.get(i + 2)) {
            (Some(&"cp"), Some(value)) => value.parse::<i32>().ok().map(Score::Cp),
            (Some(&"mate"), Some(value)) => value.parse::<i32>().ok().map(Score::Mate),
            _ => None,
        };
    }
    None
}

/// Parse the search depth from a UCI info line.
fn parse_depth(line: &str) -> Option<u32> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    for (i, part) in parts.iter().enumerate() {
        if *part == "depth" {
            return parts.get(i + 1)?.parse().ok();
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_score_cp() {
        let line = "info depth 15 seldepth 21 score cp 35 nodes 50000 pv e2e4 e7e5";
        assert_eq!(parse_score(line), Some(Score::Cp(35)));
    }

    #[test]
    fn test_parse_score_negative_cp() {
        let line = "info depth 10 score cp -150 nodes 25000 pv e7e5";
        assert_eq!(parse_score(line), Some(Score::Cp(-150)));
    }

    #[test]
    fn test_parse_score_mate() {
        let line = "info depth 12 score mate 3 nodes 10000 pv d1h5 g6h5";
        assert_eq!(parse_score(line), Some(Score::Mate(3)));
    }

    #[test]
    fn test_parse_score_mate_zero() {
        // Stockfish reports "mate 0" for a checkmated side to move.
        let line = "info depth 0 score mate 0";
        assert_eq!(parse_score(line), Some(Score::Mate(0)));
    }

    #[test]
    fn test_parse_score_missing() {
        assert_eq!(parse_score("info depth 15 nodes 50000 pv e2e4"), None);
        assert_eq!(parse_score("info string NNUE evaluation enabled"), None);
    }

    #[test]
    fn test_parse_depth() {
        let line = "info depth 15 score cp 35 nodes 50000";
        assert_eq!(parse_depth(line), Some(15));
        assert_eq!(parse_depth("info score cp 35"), None);
    }

    #[tokio::test]
    async fn test_spawn_missing_binary_is_unavailable() {
        let config = EngineConfig {
            path: "/nonexistent/path/to/stockfish".to_string(),
            ..EngineConfig::default()
        };
        let result = StockfishSession::spawn(&config).await;
        assert!(matches!(result, Err(EngineError::Unavailable(_))));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_wedged_engine_fails_within_resync_bound() {
        use std::os::unix::fs::PermissionsExt;

        // Fake engine: completes the handshake, ignores `go`, answers
        // `stop` with a bestmove, then never acknowledges `isready`
        // again. Without a bound on the readyok wait, `evaluate` would
        // hang here forever.
        let script = "#!/bin/sh\n\
            ready=0\n\
            while read line; do\n\
              case \"$line\" in\n\
                uci) echo uciok ;;\n\
                isready) if [ \"$ready\" = 0 ]; then echo readyok; ready=1; fi ;;\n\
                stop) echo \"bestmove a1a1\" ;;\n\
                quit) exit 0 ;;\n\
              esac\n\
            done\n";
        let path = std::env::temp_dir().join(format!("wedged-engine-{}.sh", std::process::id()));
        std::fs::write(&path, script).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();

        let config = EngineConfig {
            path: path.to_string_lossy().into_owned(),
            eval_timeout: Duration::from_millis(100),
            resync_timeout: Duration::from_millis(100),
            ..EngineConfig::default()
        };
        let mut session = StockfishSession::spawn(&config).await.unwrap();

        let start = tokio::time::Instant::now();
        let result = session
            .evaluate("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1", 10)
            .await;
        assert!(matches!(result, Err(EngineError::Crashed(_))));
        assert!(start.elapsed() < Duration::from_secs(2));

        let _ = std::fs::remove_file(&path);
    }
}
