use clap::{Parser, Subcommand};
use color_eyre::{eyre::eyre, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};

use stockdb_client::api::types::ReceiptFile;
use stockdb_client::api::HttpTransport;
use stockdb_client::config::Config;
use stockdb_client::resources::{PlotSource, PortfolioPlotKey, StockPlotKey};
use stockdb_client::state::Keyed;
use stockdb_client::{logging, Client, Store};

#[derive(Parser, Debug)]
#[command(name = "stockdb-client")]
#[command(about = "Command line client for the stockdb portfolio tracker")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/stockdb-client/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// List known stocks
  Stocks,
  /// Portfolio performance per account
  Performance,
  Accounts,
  Transactions,
  /// Portfolio value over a date range
  PortfolioPlot {
    #[arg(long)]
    start: String,
    #[arg(long)]
    end: String,
    #[arg(long, default_value = "auto")]
    source: PlotSource,
  },
  /// Price history of one stock
  StockPlot {
    isin: String,
    #[arg(long)]
    start: String,
    #[arg(long)]
    end: String,
    #[arg(long, default_value = "auto")]
    source: PlotSource,
  },
  DeleteAccount {
    id: i32,
  },
  DeleteTransaction {
    id: i32,
  },
  /// Import transactions from receipt files
  UploadReceipts {
    #[arg(required = true)]
    files: Vec<PathBuf>,
  },
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
  let text = serde_json::to_string_pretty(value)
    .map_err(|e| eyre!("Failed to serialize output: {}", e))?;
  println!("{}", text);
  Ok(())
}

fn read_receipt(path: &Path) -> Result<ReceiptFile> {
  let bytes = std::fs::read(path)
    .map_err(|e| eyre!("Failed to read receipt {}: {}", path.display(), e))?;
  let name = path
    .file_name()
    .map(|n| n.to_string_lossy().into_owned())
    .ok_or_else(|| eyre!("Not a file: {}", path.display()))?;

  Ok(ReceiptFile { name, bytes })
}

async fn run(client: &Client<HttpTransport>, command: Command) -> Result<()> {
  let store = client.store();

  match command {
    Command::Stocks => {
      client.update_stocks().await?;
      print_json(&store.snapshot(|s| &s.stocks)?)
    }
    Command::Performance => {
      client.update_performance().await?;
      print_json(&store.snapshot(|s| &s.performance)?)
    }
    Command::Accounts => {
      client.update_accounts().await?;
      print_json(&store.snapshot(|s| &s.accounts)?)
    }
    Command::Transactions => {
      client.update_transactions().await?;
      print_json(&store.snapshot(|s| &s.transactions)?)
    }
    Command::PortfolioPlot { start, end, source } => {
      let key = PortfolioPlotKey::new(start, end, source);
      client.update_portfolio_plot(&key).await?;
      let entry = client
        .entry(&key)?
        .ok_or_else(|| eyre!("No portfolio plot entry after fetch"))?;
      print_json(&Keyed {
        key: &key,
        entry: &entry,
      })
    }
    Command::StockPlot {
      isin,
      start,
      end,
      source,
    } => {
      let key = StockPlotKey::new(isin, start, end, source);
      client.update_stock_plot(&key).await?;
      let entry = client
        .entry(&key)?
        .ok_or_else(|| eyre!("No stock plot entry after fetch"))?;
      print_json(&Keyed {
        key: &key,
        entry: &entry,
      })
    }
    Command::DeleteAccount { id } => {
      client.delete_account(id).await?;
      print_json(&store.snapshot(|s| &s.accounts.modify)?)
    }
    Command::DeleteTransaction { id } => {
      client.delete_transaction(id).await?;
      print_json(&store.snapshot(|s| &s.transactions.modify)?)
    }
    Command::UploadReceipts { files } => {
      let receipts = files
        .iter()
        .map(|path| read_receipt(path))
        .collect::<Result<Vec<_>>>()?;
      client.upload_receipts(&receipts).await?;
      print_json(&store.snapshot(|s| &s.receipts)?)
    }
  }
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();

  let config = Config::load(args.config.as_deref())?;
  let _guard = logging::init(config.log_level.as_deref())?;

  let transport = HttpTransport::new(&config.server.url)?;
  let client = Client::new(Store::new(), transport);

  let password = Config::get_password()?;
  client.login(&config.server.user, &password).await?;
  let session = client.store().snapshot(|s| &s.session)?;
  if !session.is_authenticated() {
    let reason = session
      .error
      .map(|e| e.to_string())
      .unwrap_or_else(|| "unknown error".to_string());
    return Err(eyre!("Login as {} failed: {}", config.server.user, reason));
  }

  run(&client, args.command).await
}
