use anyhow::{Context, Result, bail};
use memosuite_config::Config;
use memosuite_engine::{
    Autosaver, DraftStore, EmbedKind, EmbedPreview, JsonFileDraftStore, Language, Library, MemoId, export_backup,
    import_backup, io, locate_at, prune, reconcile, render_document, scan_blocks,
};
use relative_path::RelativePath;
use std::{env, fs, path::PathBuf, process};

const USAGE: &str = "Usage: memosuite-cli [--data <dir>] <command>

Commands:
  blocks <memo>                                  list embedded blocks
  locate <memo> <kind> <line>                    find the block of <kind> around <line>
  replace <memo> <kind> <payload-file> [--checkpoint <file>]
                                                 merge an edited payload into the memo
  render <memo> [--lang <code>] [--html]         summarize embed previews
  export <out> [--password <pw>] [--memo <id>]... write a backup of the library
  import <in> [--password <pw>]                  merge a backup into the library
  drafts                                         list autosave drafts

Memo paths are relative to the data directory.";

/// Remove `--name <value>` from `args`, returning the value.
fn take_flag(args: &mut Vec<String>, name: &str) -> Result<Option<String>> {
    let Some(pos) = args.iter().position(|a| a == name) else {
        return Ok(None);
    };
    if pos + 1 >= args.len() {
        bail!("{name} needs a value");
    }
    let value = args.remove(pos + 1);
    args.remove(pos);
    Ok(Some(value))
}

fn take_switch(args: &mut Vec<String>, name: &str) -> bool {
    let before = args.len();
    args.retain(|a| a != name);
    args.len() != before
}

fn take_all(args: &mut Vec<String>, name: &str) -> Result<Vec<String>> {
    let mut values = Vec::new();
    while let Some(value) = take_flag(args, name)? {
        values.push(value);
    }
    Ok(values)
}

fn arg<'a>(args: &'a [String], index: usize, what: &str) -> Result<&'a str> {
    args.get(index)
        .map(String::as_str)
        .with_context(|| format!("missing {what}\n\n{USAGE}"))
}

fn resolve_config(data_flag: Option<String>) -> Result<Config> {
    let config_path = Config::config_path();
    let loaded = Config::load()
        .with_context(|| format!("Failed to load config file {}", config_path.display()))?;

    let from_config = data_flag.is_none();
    let mut config = match (data_flag, loaded) {
        (Some(data), Some(mut config)) => {
            config.data_path = PathBuf::from(data);
            config
        }
        (Some(data), None) => Config::new(data),
        (None, Some(config)) => config,
        (None, None) => {
            eprintln!("Error: No data directory provided and no config file found");
            eprintln!("Use --data <dir> or create a config file at {}", config_path.display());
            process::exit(1);
        }
    };

    if let Err(e) = io::validate_data_dir(&config.data_path) {
        let source = if from_config {
            format!(" from config file '{}'", config_path.display())
        } else {
            String::new()
        };
        bail!(
            "Data path '{}'{} is invalid: {e}",
            config.data_path.display(),
            source
        );
    }

    config.data_path = config.data_path.canonicalize()?;
    Ok(config)
}

fn read_memo(config: &Config, memo: &str) -> Result<String> {
    io::read_file(RelativePath::new(memo), &config.data_path)
        .with_context(|| format!("Failed to read memo {memo}"))
}

fn parse_kind(token: &str) -> Result<EmbedKind> {
    token
        .parse()
        .with_context(|| format!("unknown block kind '{token}'"))
}

fn cmd_blocks(config: &Config, memo: &str) -> Result<()> {
    let text = read_memo(config, memo)?;
    for block in scan_blocks(&text) {
        println!(
            "{:<12} lines {}-{} ({} bytes)",
            block.kind.token(),
            block.start_line,
            block.end_line,
            block.payload(&text).len()
        );
    }
    Ok(())
}

fn cmd_locate(config: &Config, memo: &str, kind: &str, line: &str) -> Result<()> {
    let text = read_memo(config, memo)?;
    let kind = parse_kind(kind)?;
    let line: usize = line.parse().with_context(|| format!("invalid line '{line}'"))?;

    match locate_at(&text, kind, line) {
        Some(range) => println!("{} {}", range.start_line, range.end_line),
        None => println!("not found"),
    }
    Ok(())
}

fn cmd_replace(
    config: &Config,
    memo: &str,
    kind: &str,
    payload_file: &str,
    checkpoint_file: Option<String>,
) -> Result<()> {
    let text = read_memo(config, memo)?;
    let kind = parse_kind(kind)?;
    if !kind.is_editable() {
        bail!("{kind} blocks are render-only");
    }
    let payload = fs::read_to_string(payload_file)
        .with_context(|| format!("Failed to read payload {payload_file}"))?;
    let checkpoint = checkpoint_file
        .map(|path| {
            fs::read_to_string(&path).with_context(|| format!("Failed to read checkpoint {path}"))
        })
        .transpose()?;

    let result = reconcile(&text, kind, &payload, checkpoint.as_deref());
    io::write_file(RelativePath::new(memo), &config.data_path, &result.text)?;
    println!("{:?}", result.outcome);
    Ok(())
}

fn cmd_render(config: &Config, memo: &str, lang: Option<String>, html: bool) -> Result<()> {
    let text = read_memo(config, memo)?;
    let language = lang.as_deref().map(Language::from_code).unwrap_or_default();
    for rendered in render_document(&text, language) {
        println!(
            "{}-{}: {}",
            rendered.block.start_line,
            rendered.block.end_line,
            rendered.preview.summary()
        );
        match &rendered.preview {
            EmbedPreview::Spreadsheet(grid) => {
                if html {
                    println!("{}", grid.to_html());
                }
                if grid.truncated {
                    println!("  {}", language.more_data());
                }
            }
            EmbedPreview::Drawing(scene) => {
                println!("  preview height {}", scene.preview_height());
            }
            EmbedPreview::YouTube(video) => println!("  {}", video.embed_url()),
            EmbedPreview::Web(web) => {
                if let Some(host) = web.host() {
                    println!("  {host}");
                }
            }
            _ => {}
        }
    }
    Ok(())
}

fn cmd_export(
    config: &Config,
    out: &str,
    password: Option<String>,
    memos: Vec<String>,
) -> Result<()> {
    let library = Library::load(&config.data_path)?;
    let selected: Vec<MemoId> = memos
        .iter()
        .map(|id| id.parse::<MemoId>().with_context(|| format!("invalid memo id '{id}'")))
        .collect::<Result<_>>()?;
    let selected = (!selected.is_empty()).then_some(selected.as_slice());

    let json = export_backup(
        &library,
        selected,
        &config.backup.app_name,
        password.as_deref(),
        chrono::Utc::now(),
    )?;
    fs::write(out, json).with_context(|| format!("Failed to write {out}"))?;
    println!("Wrote {out}");
    Ok(())
}

fn cmd_import(config: &Config, input: &str, password: Option<String>) -> Result<()> {
    let json = fs::read_to_string(input).with_context(|| format!("Failed to read {input}"))?;
    let data = import_backup(&json, password.as_deref())?;

    let mut library = Library::load(&config.data_path)?;
    let report = library.merge(data);
    library.save(&config.data_path)?;

    println!(
        "Added {} folders, {} memos, {} comments ({} memos already present)",
        report.folders_added, report.memos_added, report.comments_added, report.memos_matched
    );
    Ok(())
}

fn cmd_drafts(config: &Config) -> Result<()> {
    let mut store = JsonFileDraftStore::open(&config.data_path)?;
    let pruned = prune(&mut store, config.autosave.max_drafts)?;
    if pruned > 0 {
        log::info!("Pruned {pruned} drafts over the limit");
    }

    let now = chrono::Utc::now();
    for draft in store.ordered_by_created_at()?.iter().rev() {
        let owner = match draft.original_id {
            Some(id) => format!("memo {id}"),
            None => "new memo".to_string(),
        };
        let settled = Autosaver::due(Some(draft.created_at), now, config.autosave.interval());
        println!(
            "#{:<4} {:<10} {} {:?}{}",
            draft.id.unwrap_or_default(),
            owner,
            draft.created_at.format("%Y-%m-%d %H:%M:%S"),
            draft.title,
            if settled { "" } else { " (recent)" }
        );
    }
    Ok(())
}

fn run(mut args: Vec<String>) -> Result<()> {
    let data_flag = take_flag(&mut args, "--data")?;
    let password = take_flag(&mut args, "--password")?;
    let checkpoint = take_flag(&mut args, "--checkpoint")?;
    let lang = take_flag(&mut args, "--lang")?;
    let memos = take_all(&mut args, "--memo")?;
    let html = take_switch(&mut args, "--html");

    let command = arg(&args, 1, "command")?.to_string();
    let config = resolve_config(data_flag)?;
    log::info!("Data path: {}", config.data_path.display());

    match command.as_str() {
        "blocks" => cmd_blocks(&config, arg(&args, 2, "memo")?),
        "locate" => cmd_locate(
            &config,
            arg(&args, 2, "memo")?,
            arg(&args, 3, "kind")?,
            arg(&args, 4, "line")?,
        ),
        "replace" => cmd_replace(
            &config,
            arg(&args, 2, "memo")?,
            arg(&args, 3, "kind")?,
            arg(&args, 4, "payload file")?,
            checkpoint,
        ),
        "render" => cmd_render(&config, arg(&args, 2, "memo")?, lang, html),
        "export" => cmd_export(&config, arg(&args, 2, "output file")?, password, memos),
        "import" => cmd_import(&config, arg(&args, 2, "backup file")?, password),
        "drafts" => cmd_drafts(&config),
        other => bail!("unknown command '{other}'\n\n{USAGE}"),
    }
}

fn main() {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 || args.iter().any(|a| a == "--help" || a == "-h") {
        eprintln!("{USAGE}");
        process::exit(if args.len() < 2 { 1 } else { 0 });
    }

    if let Err(e) = run(args) {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
