use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use vote_engine::prelude::*;

mod hosting;
mod log;

use hosting::{load, save_into, HostConfig, JsonlAuditLog};
use log::{log, LogType, CLI};

#[derive(Parser)]
#[clap(name = "voteout")]
struct Opts {
    /// Roster and settings file.
    #[clap(short, long, default_value = "config/communities.json")]
    config: PathBuf,
    /// Append a JSON line for every passed vote.
    #[clap(long)]
    audit_log: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    let opts = Opts::parse();
    let host_config: HostConfig = load!(&opts.config);
    if !opts.config.exists() {
        if let Some(parent) = opts.config.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        save_into(&host_config, &opts.config).unwrap();
    }

    let cli: CLI = Arc::new(linefeed::Interface::new("voteout").unwrap());
    cli.set_prompt("> ").unwrap();

    let audit = opts
        .audit_log
        .as_ref()
        .map(|path| Arc::new(JsonlAuditLog::open(path).unwrap()) as Arc<dyn AuditLog>);
    let engine = hosting::build_engine(&host_config, &cli, audit);

    log(
        &cli,
        LogType::Info,
        &format!("{} communities loaded", host_config.communities.len()),
    );

    let console_handle = tokio::spawn(async move {
        while let linefeed::ReadResult::Input(input) = cli.read_line().unwrap() {
            if !handle_command(&engine, &cli, &input).await {
                break;
            }
        }
    });

    console_handle.await.unwrap();
}

/// Returns `false` when the console asked to quit.
async fn handle_command(engine: &VoteEngine, cli: &CLI, input: &str) -> bool {
    let mut words = input.split_whitespace();
    let Some(command) = words.next() else {
        return true;
    };
    let args: Vec<&str> = words.collect();

    match command {
        "vote" => match parse_ids(&args[..3.min(args.len())]) {
            Some([community, initiator, target]) if args.len() > 3 => {
                let reason = args[3..].join(" ");
                match engine
                    .begin(CommunityId(community), UserId(initiator), UserId(target), reason)
                    .await
                {
                    Ok(view) => log(
                        cli,
                        LogType::ConsoleResponse,
                        &format!(
                            "vote to {} {} is open: {} yes needed within {:?}",
                            view.punishment, view.target, view.votes_needed, view.remaining,
                        ),
                    ),
                    Err(err) => log(cli, LogType::Error, &err.to_string()),
                }
            }
            _ => log(
                cli,
                LogType::Error,
                "usage: vote <community> <initiator> <target> <reason>",
            ),
        },
        "ballot" => match parse_ids(&args[..3.min(args.len())]) {
            Some([community, voter, target]) if args.len() == 4 => {
                engine
                    .submit_ballot(
                        SessionKey::new(CommunityId(community), UserId(target)),
                        UserId(voter),
                        args[3],
                    )
                    .await;
            }
            _ => log(
                cli,
                LogType::Error,
                "usage: ballot <community> <voter> <target> <token>",
            ),
        },
        "cancel" => match parse_ids(&args) {
            Some([community, requester, target]) => {
                match engine
                    .cancel(CommunityId(community), UserId(target), UserId(requester))
                    .await
                {
                    Ok(()) => {}
                    Err(err) => log(cli, LogType::Error, &err.to_string()),
                }
            }
            _ => log(
                cli,
                LogType::Error,
                "usage: cancel <community> <requester> <target>",
            ),
        },
        "list" => match parse_ids(&args) {
            Some([community]) => {
                let active = engine.list_active(CommunityId(community)).await;
                if active.is_empty() {
                    log(cli, LogType::ConsoleResponse, "no open votes");
                }
                for view in active {
                    log(cli, LogType::ConsoleResponse, &render_view(&view));
                }
            }
            _ => log(cli, LogType::Error, "usage: list <community>"),
        },
        "show" => match parse_ids(&args) {
            Some([community, target]) => {
                match engine.lookup(CommunityId(community), UserId(target)).await {
                    Some(view) => log(cli, LogType::ConsoleResponse, &render_view(&view)),
                    None => log(cli, LogType::ConsoleResponse, "no open vote on that member"),
                }
            }
            _ => log(cli, LogType::Error, "usage: show <community> <target>"),
        },
        "quit" => return false,
        _ => log(
            cli,
            LogType::Error,
            &format!("unknown command: {}", command),
        ),
    }
    true
}

fn parse_ids<const N: usize>(args: &[&str]) -> Option<[u64; N]> {
    if args.len() != N {
        return None;
    }
    let mut ids = [0; N];
    for (id, arg) in ids.iter_mut().zip(args) {
        *id = arg.parse().ok()?;
    }
    Some(ids)
}

fn render_view(view: &SessionView) -> String {
    let initiator = match view.initiator {
        Some(user) => format!("started by {}", user),
        None => "anonymous".to_owned(),
    };
    format!(
        "{} {} ({}): {} yes / {} no / {} abstain, {} needed, {:?} left",
        view.punishment,
        view.target,
        initiator,
        view.counts.yes,
        view.counts.no,
        view.counts.abstain,
        view.votes_needed,
        view.remaining,
    )
}
