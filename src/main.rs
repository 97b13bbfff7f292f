use card_sort_common::{sort_card, SortSession};
use card_sort_rust::{api, cli, config, error, workflow};
use clap::Parser;

use api::BackendClient;
use cli::{Cli, Commands};
use config::Config;
use error::Result;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = Config::load()?;

    if let Some(url) = cli.api_url {
        config.api_url = url;
    }

    match cli.command {
        Commands::Sort { folder, session } => {
            println!("📸 card-sort - カード仕分け\n");

            let api = BackendClient::new(&config)?;
            let mut sort_session = match session {
                Some(id) => SortSession::with_id(id),
                None => SortSession::new(),
            };

            workflow::run_sort(&api, &mut sort_session, &folder, cli.verbose).await?;

            println!("\n✅ 仕分け完了");
        }

        Commands::Sessions => {
            let api = BackendClient::new(&config)?;
            let sessions = api.list_sessions().await?;

            if sessions.is_empty() {
                println!("保存済みセッションはありません");
            } else {
                println!("保存済みセッション:");
                for id in sessions {
                    println!("  {}", id);
                }
            }
        }

        Commands::Session { id } => {
            println!("📋 card-sort - セッション表示\n");

            let api = BackendClient::new(&config)?;
            let rows = api.load_session(&id).await?;

            if rows.is_empty() {
                println!("セッションに確定済みカードがありません: {}", id);
                return Ok(());
            }

            let ids: Vec<String> = rows.iter().map(|row| row.1.clone()).collect();
            let cards = api.get_cards(&ids).await?;
            let groups = workflow::group_session_cards(&rows, &cards);

            for (object_id, group) in &groups {
                println!("切り出し元: {}", object_id);
                for card in group {
                    println!(
                        "  {} ({}) €{} [{}]",
                        card.name,
                        card.set_code,
                        card.price,
                        sort_card(card)
                    );
                }
                println!();
            }

            println!("保管先の内訳:");
            for (bin, n) in workflow::tally_bins(&cards) {
                println!("  {:6} {}枚", bin.label(), n);
            }
        }

        Commands::Collection => {
            println!("🗃  card-sort - コレクション\n");

            let api = BackendClient::new(&config)?;
            let cards = api.get_collection().await?;

            println!("確定済みカード: {}枚\n", cards.len());
            for card in &cards {
                println!(
                    "  {} ({}) €{} [{}]",
                    card.name,
                    card.set_code,
                    card.price,
                    sort_card(card)
                );
            }

            println!("\n保管先の内訳:");
            for (bin, n) in workflow::tally_bins(&cards) {
                println!("  {:6} {}枚", bin.label(), n);
            }
        }

        Commands::Config { set_api_url, show } => {
            let mut config = config;

            if let Some(url) = set_api_url {
                config.set_api_url(url)?;
                println!("✔ バックエンドURLを設定しました");
            }

            if show {
                println!("設定:");
                println!("  バックエンドURL: {}", config.api_url());
                println!("  タイムアウト: {}秒", config.timeout_seconds);
                println!("  設定ファイル: {}", Config::config_path()?.display());
            }
        }
    }

    Ok(())
}
