use clap::{Parser, Subcommand};
use hearts_core::{
    Config, Difficulty, HeartsClient, HeartsState, LoseAction, RewardType, StaticTokenProvider,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "hearts")]
#[command(about = "Hearts (lives) client for the language-learning backend", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Override config file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Backend base URL (overrides the configured environment)
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Bearer token (overrides HEARTS_TOKEN and the config file)
    #[arg(long, global = true)]
    token: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the current hearts status (default)
    Status {
        /// Bypass the read cache and force a server refresh
        #[arg(long)]
        force: bool,
    },

    /// Record a wrong answer or an original-text reveal
    Lose {
        /// Difficulty of the missed exercise (easy, normal, hard)
        #[arg(long, default_value = "normal")]
        difficulty: String,

        /// Practice mode (the server does not deduct hearts)
        #[arg(long)]
        practice: bool,

        /// Record an original-text reveal instead of a wrong answer
        #[arg(long, conflicts_with_all = ["difficulty", "practice"])]
        view_original: bool,
    },

    /// Claim a heart reward
    Reward {
        /// Reward type (correct_answer, perfect_course, achievement)
        #[arg(long = "type", default_value = "correct_answer")]
        reward_type: String,
    },

    /// Update the consecutive-correct streak
    Streak {
        /// Reset the streak instead of incrementing it
        #[arg(long)]
        reset: bool,
    },
}

#[tokio::main]
async fn main() -> hearts_core::Result<()> {
    // Initialize logging
    hearts_core::logging::init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    let base_url = cli.base_url.unwrap_or_else(|| config.base_url());
    tracing::debug!("using backend at {}", base_url);

    // Token precedence: flag, then environment, then config file
    let token = cli
        .token
        .or_else(|| std::env::var("HEARTS_TOKEN").ok().filter(|t| !t.is_empty()))
        .or_else(|| config.auth.token.clone());

    let provider = match token {
        Some(token) => StaticTokenProvider::new(token),
        None => {
            println!("Not logged in - pass --token, set HEARTS_TOKEN, or add it to the config.");
            return Ok(());
        }
    };

    let mut client = HeartsClient::new(base_url, provider);

    match cli.command {
        Some(Commands::Status { force }) => cmd_status(&mut client, force).await,
        Some(Commands::Lose {
            difficulty,
            practice,
            view_original,
        }) => cmd_lose(&mut client, &difficulty, practice, view_original).await,
        Some(Commands::Reward { reward_type }) => cmd_reward(&mut client, &reward_type).await,
        Some(Commands::Streak { reset }) => cmd_streak(&mut client, reset).await,
        None => {
            // Default to "status"
            cmd_status(&mut client, false).await
        }
    }
}

async fn cmd_status(
    client: &mut HeartsClient<StaticTokenProvider>,
    force: bool,
) -> hearts_core::Result<()> {
    if let Err(error) = client.fetch_hearts(force).await {
        eprintln!("{}", client.errors().message());
        return Err(error);
    }

    display_status(client.state());
    Ok(())
}

async fn cmd_lose(
    client: &mut HeartsClient<StaticTokenProvider>,
    difficulty: &str,
    practice: bool,
    view_original: bool,
) -> hearts_core::Result<()> {
    let action = if view_original {
        LoseAction::ViewOriginal
    } else {
        LoseAction::WrongAnswer {
            difficulty: parse_difficulty(difficulty),
            practice_mode: practice,
        }
    };

    let outcome = match client.lose_heart(action).await {
        Ok(Some(outcome)) => outcome,
        Ok(None) => return Ok(()),
        Err(error) => {
            eprintln!("{}", client.errors().message());
            return Err(error);
        }
    };

    if outcome.success {
        println!("✓ Heart loss recorded");
        if let Some(lost) = outcome.hearts_lost {
            println!("  Hearts lost: {}", lost);
        }
        if let Some(remaining) = outcome.remaining_hearts {
            println!("  Remaining: {}", remaining);
        }
        if let Some(message) = &outcome.message {
            println!("  {}", message);
        }
    } else {
        println!(
            "✗ {}",
            outcome.message.as_deref().unwrap_or("Request rejected")
        );
    }

    display_status(client.state());
    Ok(())
}

async fn cmd_reward(
    client: &mut HeartsClient<StaticTokenProvider>,
    reward_type: &str,
) -> hearts_core::Result<()> {
    let outcome = match client.reward_heart(parse_reward_type(reward_type)).await {
        Ok(Some(outcome)) => outcome,
        Ok(None) => return Ok(()),
        Err(error) => {
            eprintln!("{}", client.errors().message());
            return Err(error);
        }
    };

    if outcome.success {
        println!("✓ Reward claimed");
        if let Some(rewarded) = outcome.hearts_rewarded {
            println!("  Hearts rewarded: {}", rewarded);
        }
        if let Some(message) = &outcome.message {
            println!("  {}", message);
        }
    } else {
        println!(
            "✗ {}",
            outcome.message.as_deref().unwrap_or("Request rejected")
        );
    }

    display_status(client.state());
    Ok(())
}

async fn cmd_streak(
    client: &mut HeartsClient<StaticTokenProvider>,
    reset: bool,
) -> hearts_core::Result<()> {
    let outcome = match client.update_consecutive_correct(!reset).await {
        Ok(Some(outcome)) => outcome,
        Ok(None) => return Ok(()),
        Err(error) => {
            eprintln!("{}", client.errors().message());
            return Err(error);
        }
    };

    if outcome.success {
        println!(
            "✓ Streak {}: {} correct in a row",
            if reset { "reset" } else { "updated" },
            client.state().consecutive_correct
        );
    } else {
        println!("✗ Streak update rejected");
    }

    Ok(())
}

fn parse_difficulty(value: &str) -> Difficulty {
    match value.to_lowercase().as_str() {
        "easy" => Difficulty::Easy,
        "normal" => Difficulty::Normal,
        "hard" => Difficulty::Hard,
        other => {
            eprintln!("Unknown difficulty: {}. Using normal.", other);
            Difficulty::Normal
        }
    }
}

fn parse_reward_type(value: &str) -> RewardType {
    match value.to_lowercase().as_str() {
        "correct_answer" => RewardType::CorrectAnswer,
        "perfect_course" => RewardType::PerfectCourse,
        "achievement" => RewardType::Achievement,
        other => {
            eprintln!("Unknown reward type: {}. Using correct_answer.", other);
            RewardType::CorrectAnswer
        }
    }
}

fn display_status(state: &HeartsState) {
    println!("\n╭─────────────────────────────────────────╮");
    println!("│  HEARTS STATUS");
    println!("╰─────────────────────────────────────────╯");
    println!();

    if state.bonus_hearts > 0 {
        println!(
            "  ♥ {}/{}  (+{} bonus)",
            state.current_hearts, state.max_hearts, state.bonus_hearts
        );
    } else {
        println!("  ♥ {}/{}", state.current_hearts, state.max_hearts);
    }

    println!("  Streak: {} correct in a row", state.consecutive_correct);

    if state.is_newbie {
        println!(
            "  Newbie protection: {} actions left",
            state.newbie_protection_count
        );
    }

    if let Some(countdown) = state.recovery_countdown(chrono::Utc::now()) {
        println!(
            "  Next heart in {}h {}m {}s",
            countdown.hours, countdown.minutes, countdown.seconds
        );
    }

    if !state.can_play() {
        println!("  ✗ Out of hearts");
    } else if state.is_low_hearts() {
        println!("  ⚠ Low hearts");
    }

    println!();
}
