use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::sync::Mutex as AsyncMutex;
use tracing::info;
use tracing_subscriber::EnvFilter;

use obryn::obryn::auth::{app_gate_passes, dev_gate_passes};
use obryn::obryn::models::conversations_store::ConversationStore;
use obryn::obryn::models::{ConversationKind, LearnLanguage, MessageRole};
use obryn::obryn::repositories::{JsonSnapshotRepository, SnapshotRepository};
use obryn::obryn::services::music::{HttpMusicSearchService, MusicSearchService};
use obryn::obryn::services::vision::{HttpVisionService, VisionService};
use obryn::obryn::services::voice::{UnavailableRecognizer, UnavailableSynthesizer, VoiceSession};
use obryn::obryn::services::{
    ExchangeError, HttpResponseGenerator, MessageExchange, TerminalBellNotifier,
};
use obryn::settings::repositories::{DevSettingsJsonRepository, DevSettingsRepository};

/// Obryn AI chat, reduced to a line-oriented terminal client.
#[derive(Parser)]
#[command(name = "obryn", version)]
struct Args {
    /// Base URL of the API host serving /api/chat, /api/vision and /api/music-search
    #[arg(long, default_value = "http://localhost:3000")]
    api_base: String,

    /// Directory for persisted state (defaults to the platform config dir)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Skip the entry password prompt
    #[arg(long)]
    no_gate: bool,
}

type InputLines = Lines<BufReader<Stdin>>;

async fn prompt(lines: &mut InputLines, text: &str) -> Result<Option<String>> {
    print!("{text}");
    use std::io::Write;
    std::io::stdout().flush()?;
    Ok(lines.next_line().await?)
}

async fn run_gate(lines: &mut InputLines) -> Result<bool> {
    loop {
        let Some(input) = prompt(lines, "Password: ").await? else {
            return Ok(false);
        };
        if app_gate_passes(&input) {
            return Ok(true);
        }
        println!("Incorrect password");
    }
}

fn print_conversations(store: &ConversationStore) {
    for (index, conversation) in store.conversations().iter().enumerate() {
        let marker = if Some(conversation.id()) == store.active_id() {
            "*"
        } else {
            " "
        };
        let kind = match conversation.kind() {
            ConversationKind::Chat => "chat",
            ConversationKind::Learn => "learn",
        };
        println!(
            "{marker} [{index}] {} ({kind}, {} messages)",
            conversation.title(),
            conversation.message_count()
        );
    }
}

fn print_messages(store: &ConversationStore) {
    let Some(conversation) = store.active_conversation() else {
        println!("no active conversation");
        return;
    };
    for (index, message) in conversation.messages().iter().enumerate() {
        let role = match message.role() {
            MessageRole::User => "you",
            MessageRole::Assistant => "obryn",
        };
        println!("[{index}] {role}: {}", message.content());
    }
}

fn conversation_id_at(store: &ConversationStore, index: usize) -> Option<String> {
    store
        .conversations()
        .get(index)
        .map(|c| c.id().to_string())
}

fn message_id_at(store: &ConversationStore, index: usize) -> Option<(String, String, MessageRole)> {
    let conversation = store.active_conversation()?;
    let message = conversation.messages().get(index)?;
    Some((
        conversation.id().to_string(),
        message.id().to_string(),
        message.role(),
    ))
}

async fn run_dev_settings(
    lines: &mut InputLines,
    repository: &Arc<dyn DevSettingsRepository>,
) -> Result<()> {
    let mut settings = repository.load().await?;

    let Some(input) = prompt(lines, "Dev password: ").await? else {
        return Ok(());
    };
    if !dev_gate_passes(&input, &settings) {
        println!("비밀번호가 올바르지 않습니다");
        return Ok(());
    }

    println!("dev settings — prompt <text> | length short|medium|long | restrict on|off | password <new> | done");
    loop {
        let Some(line) = prompt(lines, "dev> ").await? else {
            break;
        };
        let line = line.trim();
        match line.split_once(' ') {
            Some(("prompt", rest)) => settings.custom_system_prompt = rest.to_string(),
            Some(("length", rest)) => {
                settings.response_length = match rest.trim() {
                    "short" => obryn::settings::models::ResponseLength::Short,
                    "medium" => obryn::settings::models::ResponseLength::Medium,
                    "long" => obryn::settings::models::ResponseLength::Long,
                    other => {
                        println!("unknown length: {other}");
                        continue;
                    }
                }
            }
            Some(("restrict", rest)) => settings.no_restrictions = rest.trim() == "off",
            Some(("password", rest)) => {
                if !settings.set_site_password(rest) {
                    println!("비밀번호를 입력해주세요");
                    continue;
                }
            }
            _ if line == "done" => break,
            _ => {
                println!("unknown command");
                continue;
            }
        }
        repository.save(settings.clone()).await?;
        println!("saved");
    }
    Ok(())
}

async fn describe_image_file(vision: &dyn VisionService, path: &str) -> Result<String> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Could not read image file {path}"))?;
    let mime = match path.rsplit('.').next() {
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        _ => "image/jpeg",
    };
    let data_url = format!("data:{mime};base64,{}", BASE64.encode(bytes));
    Ok(vision.describe_image(&data_url).await)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("obryn=info")),
        )
        .init();

    let args = Args::parse();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    if !args.no_gate && !run_gate(&mut lines).await? {
        return Ok(());
    }

    let snapshot_repository: Arc<dyn SnapshotRepository> = match &args.data_dir {
        Some(dir) => Arc::new(JsonSnapshotRepository::with_path(
            dir.join("conversations.json"),
        )),
        None => Arc::new(JsonSnapshotRepository::new()?),
    };
    let settings_repository: Arc<dyn DevSettingsRepository> = match &args.data_dir {
        Some(dir) => Arc::new(DevSettingsJsonRepository::with_path(
            dir.join("dev_settings.json"),
        )),
        None => Arc::new(DevSettingsJsonRepository::new()?),
    };

    let mut store = ConversationStore::new(snapshot_repository);
    store.load().await?;
    info!(conversations = store.count(), "Store loaded");
    let store = Arc::new(AsyncMutex::new(store));

    let exchange = MessageExchange::new(
        store.clone(),
        Arc::new(HttpResponseGenerator::new(&args.api_base)?),
        settings_repository.clone(),
        Arc::new(TerminalBellNotifier),
    );
    let vision = HttpVisionService::new(&args.api_base)?;
    let music = HttpMusicSearchService::new(&args.api_base)?;

    println!("Obryn AI — /help for commands");

    loop {
        let Some(line) = prompt(&mut lines, "> ").await? else {
            break;
        };
        let line = line.trim().to_string();
        if line.is_empty() {
            continue;
        }

        if !line.starts_with('/') {
            let conversation_id = {
                let store = store.lock().await;
                store.active_id().map(str::to_string)
            };
            let Some(conversation_id) = conversation_id else {
                println!("no active conversation, use /new");
                continue;
            };
            match exchange.send(&conversation_id, &line).await {
                Ok(reply) => println!("obryn: {reply}"),
                Err(ExchangeError::Busy) => println!("still waiting for the previous reply"),
                Err(err) => println!("Sorry, I encountered an error processing your request. ({err})"),
            }
            continue;
        }

        let (command, rest) = line.split_once(' ').unwrap_or((line.as_str(), ""));
        match command {
            "/help" => {
                println!(
                    "/new  /learn <language>  /list  /select <n>  /delete <n>\n\
                     /messages  /edit <n> <text>  /delmsg <n>\n\
                     /see <image-file>  /music <query>  /voice  /dev  /quit"
                );
            }
            "/new" => {
                let mut store = store.lock().await;
                store.create_chat();
                store.persist().await?;
                println!("new conversation started");
            }
            "/learn" => match LearnLanguage::parse(rest.trim()) {
                Some(language) => {
                    let mut store = store.lock().await;
                    store.create_learn(language);
                    store.persist().await?;
                    println!("{}", language.learn_title());
                }
                None => {
                    let all: Vec<&str> = LearnLanguage::ALL.iter().map(|l| l.id()).collect();
                    println!("pick one of: {}", all.join(", "));
                }
            },
            "/list" => print_conversations(&*store.lock().await),
            "/messages" => print_messages(&*store.lock().await),
            "/select" => {
                let mut store = store.lock().await;
                let selected = rest
                    .trim()
                    .parse::<usize>()
                    .ok()
                    .and_then(|index| conversation_id_at(&store, index))
                    .map(|id| store.select_conversation(&id))
                    .unwrap_or(false);
                if selected {
                    store.persist().await?;
                } else {
                    println!("no such conversation");
                }
            }
            "/delete" => {
                let mut store = store.lock().await;
                let deleted = rest
                    .trim()
                    .parse::<usize>()
                    .ok()
                    .and_then(|index| conversation_id_at(&store, index))
                    .map(|id| store.delete_conversation(&id))
                    .unwrap_or(false);
                if deleted {
                    store.persist().await?;
                    println!("deleted");
                } else {
                    println!("no such conversation");
                }
            }
            "/delmsg" => {
                let mut store = store.lock().await;
                let target = rest
                    .trim()
                    .parse::<usize>()
                    .ok()
                    .and_then(|index| message_id_at(&store, index));
                match target {
                    Some((conversation_id, message_id, _)) => {
                        store.delete_message(&conversation_id, &message_id);
                        store.persist().await?;
                    }
                    None => println!("no such message"),
                }
            }
            "/edit" => {
                let (index, new_text) = rest.split_once(' ').unwrap_or((rest, ""));
                let mut store = store.lock().await;
                let target = index
                    .trim()
                    .parse::<usize>()
                    .ok()
                    .and_then(|index| message_id_at(&store, index));
                match target {
                    // Editing is restricted to assistant messages here; the
                    // store itself is role-agnostic
                    Some((conversation_id, message_id, MessageRole::Assistant)) => {
                        store.edit_message(&conversation_id, &message_id, new_text);
                        store.persist().await?;
                    }
                    Some(_) => println!("only assistant messages can be edited"),
                    None => println!("no such message"),
                }
            }
            "/see" => match describe_image_file(&vision, rest.trim()).await {
                Ok(description) => println!("{description}"),
                Err(err) => println!("{err:#}"),
            },
            "/music" => {
                if rest.trim().is_empty() {
                    println!("usage: /music <title or artist>");
                } else {
                    match music.search(rest.trim()).await {
                        Ok(result) => println!("{result}"),
                        Err(_) => println!("음악 검색 오류가 발생했습니다."),
                    }
                }
            }
            "/voice" => {
                // No platform speech stack in the terminal build; the session
                // reports the disabled state and stays inert
                let mut session = VoiceSession::new(
                    Box::new(UnavailableRecognizer),
                    Box::new(UnavailableSynthesizer),
                );
                match session.listen().await {
                    Ok(Some(transcript)) => println!("heard: {transcript}"),
                    Ok(None) => println!("음성이 감지되지 않았습니다. 다시 시도해주세요"),
                    Err(_) => println!("음성 인식을 지원하지 않는 환경입니다"),
                }
            }
            "/dev" => run_dev_settings(&mut lines, &settings_repository).await?,
            "/quit" => break,
            other => println!("unknown command: {other}"),
        }
    }

    Ok(())
}
