use crate::api::server as api_server;
use crate::cli::opts::*;
use crate::profile;
use crate::tui::app::TuiApp;

use anyhow::{anyhow, bail, Result};
use std::io::{stdin, stdout, Read, Write};
use std::sync::Arc;
use studyset_core::{
    codec, editor, filter_sets_by_text, import, overview, CardDraft, Repository, StudySet, Term,
    UserId,
};
use studyset_json::paths::data_root;
use studyset_json::JsonStore;
use studyset_pg::PostgresRepo;
use studyset_sqlite::SqliteRepo;
use tokio::runtime::Runtime;
use uuid::Uuid;

pub async fn run_cli(args: Cli) -> Result<()> {
    match &args.cmd {
        Command::Tui => {
            // (kept for completeness but main routes TUI directly)
            let repo = open_repo(&args).await?;
            let rt = Arc::new(Runtime::new()?);
            let mut app = TuiApp::new(repo, rt);
            app.run()?;
            Ok(())
        }
        Command::Api(api) => {
            let repo = open_repo(&args).await?;
            let addr: std::net::SocketAddr = api.addr.parse()?;
            api_server::run(repo, addr).await
        }
        _ => {
            let repo = open_repo(&args).await?;
            let user = resolve_user(args.user)?;
            match args.cmd.clone() {
                Command::Set(cmd) => set_cmd(repo, user, cmd).await,
                Command::Card(cmd) => card_cmd(repo, user, cmd).await,
                Command::Study(cmd) => study_cmd(repo, cmd).await,
                Command::Import(cmd) => import_cmd(repo, user, cmd).await,
                Command::Export(cmd) => export_cmd(repo, cmd).await,
                _ => unreachable!(),
            }
        }
    }
}

pub async fn open_repo(args: &Cli) -> Result<Arc<dyn Repository>> {
    match &args.store {
        StoreKind::Json => {
            let s = JsonStore::open_default().await?;
            Ok(Arc::new(s))
        }
        StoreKind::Sqlite => {
            let p = args
                .db_path
                .clone()
                .unwrap_or_else(|| data_root().join("studyset.sqlite3"));
            if let Some(parent) = p.parent() {
                std::fs::create_dir_all(parent).ok();
            }
            let s = SqliteRepo::open_file(&p).await?;
            Ok(Arc::new(s))
        }
        StoreKind::Pg => {
            let url = args
                .pg_url
                .as_deref()
                .ok_or_else(|| anyhow!("--pg-url is required with --store pg"))?;
            let s = PostgresRepo::connect(url).await?;
            Ok(Arc::new(s))
        }
    }
}

fn resolve_user(explicit: Option<Uuid>) -> Result<UserId> {
    if let Some(u) = explicit {
        return Ok(u);
    }
    Ok(profile::load_or_create()?.user_id)
}

async fn set_cmd(repo: Arc<dyn Repository>, user: UserId, cmd: SetCmd) -> Result<()> {
    match cmd {
        SetCmd::Create(a) => {
            let mut drafts: Vec<CardDraft> = Vec::new();
            for spec in &a.cards {
                let card = import::parse_line(spec)
                    .ok_or_else(|| anyhow!("unparseable card spec: {spec}"))?;
                drafts.push(CardDraft::new(card.term, card.definition, card.image_url));
            }
            if let Some(path) = &a.from {
                let text = std::fs::read_to_string(path)?;
                drafts.extend(
                    import::parse_lines(&text)
                        .map(|c| CardDraft::new(c.term, c.definition, c.image_url)),
                );
            }
            let set = editor::create_study_set(
                &*repo,
                user,
                &a.title,
                a.description.as_deref().unwrap_or(""),
                &drafts,
            )
            .await?;
            println!("{}", set.id);
        }
        SetCmd::List { all, filter } => {
            let sets = repo
                .list_study_sets(if all { None } else { Some(user) })
                .await?;
            let sets = match filter {
                Some(q) => filter_sets_by_text(&sets, &q),
                None => sets,
            };
            let terms = repo.list_terms(None).await?;
            for o in overview::summarize_sets(&sets, &terms) {
                println!(
                    "{}\t{}\t{} cards\t{}",
                    o.set.id,
                    o.set.title,
                    o.term_count,
                    o.set.created_at.format("%Y-%m-%d")
                );
            }
        }
        SetCmd::Show { set } => {
            let set = resolve_set(&*repo, &set).await?;
            println!("{}\t{}", set.id, set.title);
            if let Some(d) = &set.description {
                println!("{d}");
            }
            for t in repo.list_terms(Some(set.id)).await? {
                print_term(&t);
            }
        }
        SetCmd::Rename(r) => {
            let mut set = resolve_set(&*repo, &r.set).await?;
            editor::ensure_owner(&set, user)?;
            if let Some(t) = r.title {
                if t.trim().is_empty() {
                    bail!("title is required");
                }
                set.title = t.trim().to_string();
            }
            if let Some(d) = r.description {
                set.description = match d.trim() {
                    "" => None,
                    s => Some(s.to_string()),
                };
            }
            set.saved_at = chrono::Utc::now();
            repo.update_study_set(&set).await?;
            println!("ok");
        }
        SetCmd::Rm { set } => {
            let set = resolve_set(&*repo, &set).await?;
            editor::ensure_owner(&set, user)?;
            repo.delete_study_set(set.id).await?;
            println!("ok");
        }
    }
    Ok(())
}

async fn card_cmd(repo: Arc<dyn Repository>, user: UserId, cmd: CardCmd) -> Result<()> {
    match cmd {
        CardCmd::Add(a) => {
            let set = resolve_set(&*repo, &a.set).await?;
            editor::ensure_owner(&set, user)?;
            let mut drafts = editor::load_drafts(&*repo, set.id).await?;
            drafts.push(CardDraft::new(
                a.term,
                a.definition,
                a.image.unwrap_or_default(),
            ));
            save_drafts(&*repo, user, &set, &drafts).await?;
            println!("ok");
        }
        CardCmd::List { set } => {
            let set = resolve_set(&*repo, &set).await?;
            for t in repo.list_terms(Some(set.id)).await? {
                let d = codec::decode(&t.definition);
                let image = if d.image_url.is_empty() { "-" } else { d.image_url.as_str() };
                println!("{}\t{}\t{}\t{}\trank={}", t.id, t.word, d.text, image, t.rank);
            }
        }
        CardCmd::Rm { set, term_id } => {
            let id = parse_uuid(&term_id)?;
            let set = resolve_set(&*repo, &set).await?;
            editor::ensure_owner(&set, user)?;
            let mut drafts = editor::load_drafts(&*repo, set.id).await?;
            let before = drafts.len();
            drafts.retain(|d| d.persisted_id != Some(id));
            if drafts.len() == before {
                bail!("card not found in set: {term_id}");
            }
            save_drafts(&*repo, user, &set, &drafts).await?;
            println!("ok");
        }
    }
    Ok(())
}

async fn study_cmd(repo: Arc<dyn Repository>, cmd: StudyCmd) -> Result<()> {
    let set = resolve_set(&*repo, &cmd.set).await?;
    let terms = repo.list_terms(Some(set.id)).await?;
    if terms.is_empty() {
        println!("no cards in this set");
        return Ok(());
    }

    let cards: Vec<(String, codec::DecodedDefinition)> = terms
        .into_iter()
        .map(|t| (t.word, codec::decode(&t.definition)))
        .collect();

    let mut idx = 0usize;
    loop {
        let (word, decoded) = &cards[idx];
        println!("\n[{}/{}] {}", idx + 1, cards.len(), word);
        prompt_enter("[enter=flip]")?;
        if !decoded.image_url.is_empty() {
            println!("image: {}", decoded.image_url);
        }
        println!("A: {}", decoded.text);
        let line = read_line("[n=next, p=prev, q=quit]> ")?;
        match line.trim().to_lowercase().as_str() {
            "" | "n" | "next" => {
                if idx + 1 < cards.len() {
                    idx += 1;
                } else {
                    break;
                }
            }
            "p" | "prev" => {
                idx = idx.saturating_sub(1);
            }
            "q" | "quit" => break,
            _ => {}
        }
    }
    println!("\ndone");
    Ok(())
}

async fn import_cmd(repo: Arc<dyn Repository>, user: UserId, cmd: ImportCmd) -> Result<()> {
    let text = match &cmd.file {
        Some(path) => std::fs::read_to_string(path)?,
        None => {
            let mut buf = String::new();
            stdin().read_to_string(&mut buf)?;
            buf
        }
    };

    let set = resolve_set(&*repo, &cmd.set).await?;
    editor::ensure_owner(&set, user)?;
    let drafts = editor::load_drafts(&*repo, set.id).await?;
    let merged = editor::import_cards(drafts, &text)?;
    save_drafts(&*repo, user, &set, &merged).await?;

    let count = repo.list_terms(Some(set.id)).await?.len();
    println!("imported; {} now holds {} cards", set.title, count);
    Ok(())
}

async fn export_cmd(repo: Arc<dyn Repository>, cmd: ExportCmd) -> Result<()> {
    match cmd {
        ExportCmd::Json { path, set } => {
            let (study_sets, terms) = match set {
                Some(sel) => {
                    let s = resolve_set(&*repo, &sel).await?;
                    let terms = repo.list_terms(Some(s.id)).await?;
                    (vec![s], terms)
                }
                None => (
                    repo.list_study_sets(None).await?,
                    repo.list_terms(None).await?,
                ),
            };
            let bundle = ExportBundle {
                version: 1,
                study_sets,
                terms,
            };
            let s = serde_json::to_string_pretty(&bundle)?;
            std::fs::write(&path, s)?;
            println!("wrote {}", path.display());
        }
        ExportCmd::Csv { path, set } => {
            let set = resolve_set(&*repo, &set).await?;
            let terms = repo.list_terms(Some(set.id)).await?;

            let mut wtr = csv::Writer::from_path(&path)?;
            wtr.write_record(["word", "definition", "image_url", "rank"])?;
            for t in terms {
                let d = codec::decode(&t.definition);
                wtr.write_record([t.word, d.text, d.image_url, t.rank.to_string()])?;
            }
            wtr.flush()?;
            println!("wrote {}", path.display());
        }
        ExportCmd::Text { path, set } => {
            let set = resolve_set(&*repo, &set).await?;
            let mut out = String::new();
            for t in repo.list_terms(Some(set.id)).await? {
                let d = codec::decode(&t.definition);
                if d.image_url.is_empty() {
                    out.push_str(&format!("{} | {}\n", t.word, d.text));
                } else {
                    out.push_str(&format!("{} | {} | {}\n", t.word, d.text, d.image_url));
                }
            }
            std::fs::write(&path, out)?;
            println!("wrote {}", path.display());
        }
    }
    Ok(())
}

// ===== Helpers =====
fn parse_uuid(s: &str) -> Result<Uuid> {
    Uuid::parse_str(s).map_err(|_| anyhow!("invalid uuid"))
}

async fn resolve_set<R: Repository + ?Sized>(repo: &R, sel: &str) -> Result<StudySet> {
    if let Ok(id) = Uuid::parse_str(sel) {
        if let Ok(s) = repo.get_study_set(id).await {
            return Ok(s);
        }
    }
    let sets = repo.list_study_sets(None).await?;
    if let Some(s) = sets.into_iter().find(|s| s.title.eq_ignore_ascii_case(sel)) {
        return Ok(s);
    }
    bail!("study set not found: {}", sel)
}

async fn save_drafts(
    repo: &dyn Repository,
    user: UserId,
    set: &StudySet,
    drafts: &[CardDraft],
) -> Result<StudySet> {
    let saved = editor::save_existing(
        repo,
        user,
        set.id,
        &set.title,
        set.description.as_deref().unwrap_or(""),
        drafts,
    )
    .await?;
    Ok(saved)
}

fn print_term(t: &Term) {
    let d = codec::decode(&t.definition);
    if d.image_url.is_empty() {
        println!("{:>3}. {}\t{}", t.rank, t.word, d.text);
    } else {
        println!("{:>3}. {}\t{}\timage: {}", t.rank, t.word, d.text, d.image_url);
    }
}

fn prompt_enter(label: &str) -> Result<()> {
    print!("{label}");
    stdout().flush().ok();
    let mut s = String::new();
    stdin().read_line(&mut s)?;
    Ok(())
}

fn read_line(prompt: &str) -> Result<String> {
    print!("{prompt}");
    stdout().flush().ok();
    let mut s = String::new();
    stdin().read_line(&mut s)?;
    Ok(s)
}

#[derive(serde::Serialize, serde::Deserialize)]
struct ExportBundle {
    version: u32,
    study_sets: Vec<StudySet>,
    terms: Vec<Term>,
}
