use explore_history::error::Result;
use explore_history::models::HistoryGroup;
use explore_history::{App, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging (only show warnings and errors by default)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    let config = Config::load()?;
    let app = App::new(&config).await?;

    match args.get(1).map(String::as_str) {
        Some("--search") if args.len() >= 3 => {
            let query = args[2..].join(" ");
            for result in app.search(&query).await? {
                println!("{}\t{}", result.label, result.title);
                if let Some(teaser) = result.teaser {
                    println!("\t{}", teaser);
                }
            }
        }
        Some("--article") if args.len() >= 3 => {
            let article = app.open_article(&args[2]).await?;
            println!("# {}\n", article.title);
            if let Some(teaser) = article.teaser {
                println!("{}\n", teaser);
            }
            if let Some(description) = article.description {
                println!("{}", description);
            }
        }
        Some("--content") if args.len() >= 3 => {
            let content = app.content().await;
            match content.iter().find(|item| item.id.to_string() == args[2]) {
                Some(item) => {
                    app.open_content(item).await;
                    println!("{}", item.markdown);
                }
                None => eprintln!("No content item {}", args[2]),
            }
        }
        Some("--searches") => {
            for keyword in app.search_history.keywords().await {
                println!("{}", keyword);
            }
        }
        Some("--history") => print_history(&app.view_history.list().await),
        Some("--clear-searches") => {
            app.search_history.clear().await?;
            println!("Cleared search history");
        }
        Some("--clear-history") => {
            app.view_history.clear().await?;
            println!("Cleared view history");
        }
        Some(other) => {
            eprintln!("Unknown or incomplete option: {}", other);
            print_usage();
        }
        None => {
            for item in app.content().await {
                println!("--- {} ---\n{}\n", item.id, item.markdown);
            }
        }
    }

    Ok(())
}

fn print_history(groups: &[HistoryGroup]) {
    if groups.is_empty() {
        println!("No history yet");
        return;
    }
    for group in groups {
        println!("{}", group.title().to_uppercase());
        for entry in &group.entries {
            println!("  {}\t{}", entry.label, entry.title);
        }
    }
}

fn print_usage() {
    eprintln!(
        "usage: explore-history [--search <query> | --article <label> | --content <id> | --searches | --history | --clear-searches | --clear-history]"
    );
}
