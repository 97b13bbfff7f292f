use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "card-sort")]
#[command(about = "物理カード仕分けアシスタント", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// バックエンドURL（設定ファイルより優先）
    #[arg(long, global = true)]
    pub api_url: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 写真フォルダを対話的に仕分ける
    Sort {
        /// カード写真フォルダのパス
        #[arg(required = true)]
        folder: PathBuf,

        /// 既存セッションの続きから始める（省略時は新規セッション）
        #[arg(short, long)]
        session: Option<String>,
    },

    /// 保存済みセッションの一覧を表示
    Sessions,

    /// 保存済みセッションを読み出して保管先とともに表示
    Session {
        /// セッションID
        #[arg(required = true)]
        id: String,
    },

    /// コレクション全体を保管先とともに表示
    Collection,

    /// 設定を表示/編集
    Config {
        /// バックエンドURLを設定
        #[arg(long)]
        set_api_url: Option<String>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },
}
