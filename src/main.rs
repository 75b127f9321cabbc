use colored::*;
use std::path::PathBuf;
use tokio::io::{self, AsyncBufReadExt, AsyncWriteExt, BufReader};
use vibe_wallpaper::{
    AspectRatio, GeminiClient, ImagenClient, Session, SessionController, Status,
    WallpaperClient, WallpaperConfig,
};

type Controller = SessionController<WallpaperClient<ImagenClient>>;

#[derive(Debug, PartialEq)]
enum Input {
    Prompt(String),
    Ratio(String),
    Open(usize),
    Close,
    Remix,
    Download(PathBuf),
    State,
    Help,
    Quit,
    Unknown(String),
}

fn parse_input(line: &str) -> Input {
    let line = line.trim_end_matches(['\r', '\n']);
    let Some(command) = line.strip_prefix(':') else {
        return Input::Prompt(line.to_string());
    };

    let mut parts = command.trim().splitn(2, char::is_whitespace);
    let name = parts.next().unwrap_or_default();
    let arg = parts.next().map(str::trim).unwrap_or_default();

    match name {
        "ratio" | "r" => Input::Ratio(arg.to_string()),
        "open" | "o" => match arg.parse::<usize>() {
            Ok(n) if n >= 1 => Input::Open(n - 1),
            _ => Input::Unknown(format!("open needs an image number, got '{}'", arg)),
        },
        "close" | "c" | "esc" => Input::Close,
        "remix" => Input::Remix,
        "download" | "d" => Input::Download(PathBuf::from(if arg.is_empty() { "." } else { arg })),
        "state" | "s" => Input::State,
        "help" | "h" | "?" => Input::Help,
        "quit" | "q" | "exit" => Input::Quit,
        other => Input::Unknown(format!("unknown command ':{}'", other)),
    }
}

fn print_help() {
    println!("{}", "Type a prompt and press Enter to generate.".bold());
    println!("  :ratio <r>       aspect ratio, one of {}", ratio_list());
    println!("  :open <n>        view image n full-screen");
    println!("  :close           close the full-screen view");
    println!("  :remix           generate again from the last prompt");
    println!("  :download [dir]  save the open image");
    println!("  :state           show the current screen again");
    println!("  :quit");
}

fn ratio_list() -> String {
    AspectRatio::ALL.map(|r| r.as_str()).join(" ")
}

fn render(session: &Session) {
    println!();
    println!(
        "{} {}   {} {}",
        "prompt:".bright_black(),
        session.current_prompt(),
        "ratio:".bright_black(),
        session.aspect_ratio().to_string().cyan()
    );

    if let Some(message) = session.error_message() {
        println!("{}", format!(" {} ", message).white().on_red());
    }

    match session.status() {
        Status::Generating => {
            println!("{}", "Generating your vibes...".purple().bold());
            println!("{}", "This can take a moment.".bright_black());
        }
        Status::Idle => {
            println!("{}", "Describe your mood, a scene, or a style to begin.".bright_black());
            println!("{}", "e.g., \"Bioluminescent forest at night\"".bright_black());
        }
        Status::Succeeded | Status::Failed => {}
    }

    for (i, image) in session.images().iter().enumerate() {
        let marker = if session.selected_index() == Some(i) { "▶" } else { " " };
        println!(
            "{} [{}] {} ({} KB)",
            marker,
            i + 1,
            image.mime_type,
            image.encoded_len() * 3 / 4 / 1024
        );
    }

    if let Some(image) = session.selected_image() {
        let uri = image.data_uri();
        let preview: String = uri.chars().take(64).collect();
        println!("{}", "─".repeat(48).bright_black());
        println!("{} {}…", "viewing:".bold(), preview);
        println!(
            "{}",
            ":download [dir]   :remix   :close".bright_black()
        );
    }
}

async fn handle(controller: &Controller, input: Input) -> bool {
    let busy = controller.snapshot().await.is_generating();
    match input {
        Input::Prompt(_) | Input::Remix if busy => {
            println!("{}", "Still generating, wait for the current wallpapers.".yellow());
            return true;
        }
        Input::Prompt(text) => {
            controller.edit_prompt(text).await;
            if !controller.snapshot().await.current_prompt().trim().is_empty() {
                println!("{}", "Generating your vibes...".purple().bold());
            }
            controller.submit().await;
        }
        Input::Ratio(value) => match value.parse::<AspectRatio>() {
            Ok(ratio) => controller.set_aspect_ratio(ratio).await,
            Err(e) => println!("{}", e.to_string().red()),
        },
        Input::Open(index) => {
            if controller.select_image(index).await.is_none() {
                println!("{}", format!("no image {}", index + 1).red());
            }
        }
        Input::Close => controller.close_selection().await,
        Input::Remix => {
            if controller.snapshot().await.can_remix() {
                println!("{}", "Remixing...".purple().bold());
            }
            controller.remix().await;
        }
        Input::Download(dir) => match controller.download(&dir).await {
            Ok(path) => println!("{} {}", "saved".green(), path.display()),
            Err(e) => println!("{}", e.to_string().red()),
        },
        Input::State => {}
        Input::Help => {
            print_help();
            return true;
        }
        Input::Quit => return false,
        Input::Unknown(message) => {
            println!("{}", message.red());
            return true;
        }
    }

    render(&controller.snapshot().await);
    true
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let dotenv_loaded = dotenv::dotenv().is_ok();
    vibe_wallpaper::logger::init()?;
    if !dotenv_loaded {
        log::debug!("No .env file found, using process environment");
    }
    vibe_wallpaper::logger::log_startup_info("Vibe Wallpaper", env!("CARGO_PKG_VERSION"));

    let config = WallpaperConfig::from_env();
    vibe_wallpaper::logger::log_config_info(&config);

    let client = match GeminiClient::new(config) {
        Ok(client) => client,
        Err(e) => {
            log::error!("Failed to initialize image client: {}", e);
            return Err(e.into());
        }
    };
    let controller = SessionController::new(client.into_wallpapers());

    println!("{}", "Vibe Wallpaper".purple().bold());
    println!("Craft the perfect wallpaper for your phone. {}", ":help for commands".bright_black());
    render(&controller.snapshot().await);

    let mut lines = BufReader::new(io::stdin()).lines();
    let mut stdout = io::stdout();
    loop {
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        if !handle(&controller, parse_input(&line)).await {
            break;
        }
    }

    Ok(())
}
