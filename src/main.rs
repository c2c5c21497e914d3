use clap::Parser;
use dbql::database::Database;
use dbql::error::Result;
use dbql::executor::Executor;
use dbql::gui;
use std::io::Write;
use std::path::PathBuf;
use tokio::io::{self, AsyncBufReadExt, BufReader};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Small table store with a SQL-like query language
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Database file for the line shell. Without one the GUI starts.
    #[arg(value_name = "DATABASE FILE")]
    database: Option<PathBuf>,
}

enum Meta {
    Exit,
    Message(String),
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let Some(path) = args.database else {
        if let Err(e) = gui::Application::new(Executor::new()).launch() {
            error!(%e, "GUI exited with an error");
        }
        return Ok(());
    };

    let mut db = Database::new();
    if path.exists() {
        db.load_from_file(&path).await?;
    } else {
        info!(path = %path.display(), "file not found, starting an empty database");
    }
    repl(Executor::with_database(db), path).await
}

async fn repl(mut exe: Executor, mut path: PathBuf) -> Result<()> {
    println!("dbql shell (type '.exit' or '.quit' to stop, '.save' to write the file)");
    let mut lines = BufReader::new(io::stdin()).lines();
    let mut buffer = String::new();
    loop {
        if buffer.is_empty() {
            print!("sql> ");
        } else {
            print!("...  ");
        }
        std::io::stdout().flush()?;
        let Some(input) = lines.next_line().await? else {
            break;
        };
        let trimmed = input.trim();
        if buffer.is_empty() && trimmed.starts_with('.') {
            match run_meta(&mut exe, &mut path, trimmed).await {
                Ok(Meta::Exit) => break,
                Ok(Meta::Message(msg)) => println!("{msg}"),
                Err(e) => println!("Error: {e}"),
            }
            continue;
        }
        buffer.push_str(&input);
        buffer.push('\n');
        // statements run once the line ends with ';'
        if trimmed.ends_with(';') {
            let src = std::mem::take(&mut buffer);
            for result in exe.run(&src) {
                println!("{result}");
            }
        }
    }
    Ok(())
}

async fn run_meta(exe: &mut Executor, path: &mut PathBuf, line: &str) -> Result<Meta> {
    let mut words = line.split_whitespace();
    let command = words.next().unwrap_or_default();
    let target = words.next().map(PathBuf::from);
    Ok(match command {
        ".exit" | ".quit" => Meta::Exit,
        ".tables" => Meta::Message(exe.database().table_names().collect::<Vec<_>>().join("\n")),
        ".save" => {
            let target = target.unwrap_or_else(|| path.clone());
            exe.database().save_to_file(&target).await?;
            let msg = format!("Saved to {}", target.display());
            *path = target;
            Meta::Message(msg)
        }
        ".load" => {
            let target = target.unwrap_or_else(|| path.clone());
            exe.database_mut().load_from_file(&target).await?;
            let msg = format!("Loaded {}", target.display());
            *path = target;
            Meta::Message(msg)
        }
        other => Meta::Message(format!("Unknown command: {other}")),
    })
}

#[cfg(test)]
mod test {
    use super::*;

    #[tokio::test]
    async fn test_failed_load_keeps_path() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.db");
        let mut path = good.clone();
        let mut exe = Executor::new();
        exe.run("create t a INT; insert into t a = 1;");

        let missing = dir.path().join("missing.db");
        let line = format!(".load {}", missing.display());
        assert!(run_meta(&mut exe, &mut path, &line).await.is_err());
        assert_eq!(path, good);

        assert!(matches!(
            run_meta(&mut exe, &mut path, ".save").await,
            Ok(Meta::Message(_))
        ));
        assert!(good.exists());
        assert!(!missing.exists());
    }

    #[tokio::test]
    async fn test_save_to_new_path_switches_session() {
        let dir = tempfile::tempdir().unwrap();
        let mut path = dir.path().join("first.db");
        let second = dir.path().join("second.db");
        let mut exe = Executor::new();
        let line = format!(".save {}", second.display());
        run_meta(&mut exe, &mut path, &line).await.unwrap();
        assert_eq!(path, second);
        assert!(second.exists());
    }
}
