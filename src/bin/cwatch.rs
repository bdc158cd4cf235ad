//! `cwatch`: command-line access to the Cryptowatch REST API.
//!
//! ```bash
//! cwatch markets price kraken btcusd
//! cwatch markets ohlcv kraken btcusd --periods 1h,1d --by-label --format table
//! cwatch --format json --pretty assets list --limit 5
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};
use cwatch_rs::conversion::{unstructure, unstructure_canonical};
use cwatch_rs::{
    CryptowatchClient, CryptowatchError, OhlcvResult, PaginatedResponse, Period, Response,
    ResponseRoot, SummaryKey,
};
use serde::Serialize;
use serde_json::{Map, Value};
use std::time::Duration;
use tabled::settings::Style;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "cwatch", version, about = "Cryptowatch REST API client")]
struct Cli {
    /// API key; defaults to `CW_API_KEY` (also read from `.env`).
    #[arg(long, global = true)]
    api_key: Option<String>,

    /// Output format.
    ///
    /// - records: one flat row per item, canonical snake_case columns
    /// - objects: the result as nested canonical objects
    /// - json: the full response in the API's wire shape
    /// - csv: records as CSV with a header row
    /// - table: records as a text table
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Records)]
    format: OutputFormat,

    /// Indent JSON output.
    #[arg(long, global = true, default_value_t = false)]
    pretty: bool,

    #[arg(long, global = true, hide = true)]
    base_url: Option<String>,

    /// Request timeout in seconds.
    #[arg(long, global = true, default_value_t = 30)]
    timeout_secs: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Records,
    Objects,
    Json,
    Csv,
    Table,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// API status information.
    Info,
    #[command(subcommand)]
    Assets(AssetsCommand),
    #[command(subcommand)]
    Pairs(PairsCommand),
    #[command(subcommand)]
    Markets(MarketsCommand),
    #[command(subcommand)]
    Exchanges(ExchangesCommand),
}

#[derive(Debug, Args)]
struct PageArgs {
    #[arg(long)]
    cursor: Option<String>,
    /// Page size, at most 5000.
    #[arg(long)]
    limit: Option<u32>,
}

#[derive(Debug, Args)]
struct MarketArgs {
    /// Exchange symbol, e.g. `kraken`.
    exchange: String,
    /// Pair symbol, e.g. `btcusd`.
    pair: String,
}

#[derive(Debug, Subcommand)]
enum AssetsCommand {
    List(PageArgs),
    Get { asset: String },
}

#[derive(Debug, Subcommand)]
enum PairsCommand {
    List(PageArgs),
    Get { pair: String },
}

#[derive(Debug, Subcommand)]
enum MarketsCommand {
    List(PageArgs),
    Get(MarketArgs),
    Price(MarketArgs),
    Prices(PageArgs),
    Trades {
        #[command(flatten)]
        market: MarketArgs,
        /// Unix timestamp.
        #[arg(long)]
        since: Option<i64>,
        #[arg(long)]
        limit: Option<u32>,
    },
    Summary(MarketArgs),
    Summaries {
        #[command(flatten)]
        page: PageArgs,
        /// `id` or `symbols`.
        #[arg(long)]
        key_by: Option<SummaryKey>,
    },
    Orderbook {
        #[command(flatten)]
        market: MarketArgs,
        #[arg(long)]
        depth: Option<u32>,
        /// Basis points from the best price.
        #[arg(long)]
        span: Option<f64>,
        #[arg(long)]
        limit: Option<u32>,
    },
    OrderbookLiquidity(MarketArgs),
    Calculate {
        #[command(flatten)]
        market: MarketArgs,
        /// Base amount to buy and sell.
        amount: f64,
    },
    Ohlcv {
        #[command(flatten)]
        market: MarketArgs,
        #[arg(long)]
        before: Option<i64>,
        #[arg(long)]
        after: Option<i64>,
        /// Comma-separated seconds or labels, e.g. `60,1h,1w_monday`.
        #[arg(long, value_delimiter = ',')]
        periods: Vec<Period>,
        /// Key candles by label (`1h`) instead of seconds (`3600`).
        #[arg(long, default_value_t = false)]
        by_label: bool,
    },
}

#[derive(Debug, Subcommand)]
enum ExchangesCommand {
    List,
    Get { exchange: String },
    Markets { exchange: String },
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Client(#[from] CryptowatchError),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    fn exit_code(&self) -> i32 {
        match self {
            Self::Client(
                CryptowatchError::MissingParameter(_)
                | CryptowatchError::InvalidPeriod(_)
                | CryptowatchError::InvalidParameter(_)
                | CryptowatchError::ApiKey(_),
            ) => 2,
            Self::Client(_) => 1,
            Self::Serialization(_) | Self::Csv(_) | Self::Io(_) => 10,
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cwatch_rs=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(error) = run().await {
        eprintln!("error: {error}");
        std::process::exit(error.exit_code());
    }
}

async fn run() -> Result<(), CliError> {
    let cli = Cli::parse();

    let mut builder = CryptowatchClient::builder().timeout(Duration::from_secs(cli.timeout_secs));
    if let Some(api_key) = &cli.api_key {
        builder = builder.api_key(api_key.clone());
    }
    if let Some(base_url) = &cli.base_url {
        builder = builder.base_url(base_url.clone());
    }
    let client = builder.build()?;

    let output = execute(&client, cli.command).await?;
    println!("{}", render(&output, cli.format, cli.pretty)?);
    Ok(())
}

/// How a result breaks into table rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Layout {
    /// One record, one row.
    Single,
    /// A list of records.
    List,
    /// Map of key -> record; the key fills the named column.
    Keyed(&'static str),
    /// Map of key -> list of records; the key fills the named column and
    /// scalar entries repeat on every row.
    Grouped(&'static str),
}

/// A response encoded for every output format.
#[derive(Debug)]
struct Output {
    wire: Value,
    result: Value,
    layout: Layout,
}

/// Envelopes that carry a `result`.
trait Envelope: Serialize {
    type Result: Serialize;

    fn result(&self) -> &Self::Result;
}

impl<T: Serialize> Envelope for ResponseRoot<T> {
    type Result = T;

    fn result(&self) -> &T {
        &self.result
    }
}

impl<T: Serialize> Envelope for Response<T> {
    type Result = T;

    fn result(&self) -> &T {
        &self.result
    }
}

impl<T: Serialize> Envelope for PaginatedResponse<T> {
    type Result = T;

    fn result(&self) -> &T {
        &self.result
    }
}

fn encode<E: Envelope>(envelope: &E, layout: Layout) -> Result<Output, CliError> {
    Ok(Output {
        wire: unstructure(envelope)?,
        result: unstructure_canonical(envelope.result())?,
        layout,
    })
}

async fn execute(client: &CryptowatchClient, command: Command) -> Result<Output, CliError> {
    use Layout::{List, Single};

    match command {
        Command::Info => encode(&client.get_info().await?, Single),
        Command::Assets(command) => match command {
            AssetsCommand::List(page) => {
                encode(&client.list_assets(page.cursor, page.limit).await?, List)
            }
            AssetsCommand::Get { asset } => encode(&client.get_asset(&asset).await?, Single),
        },
        Command::Pairs(command) => match command {
            PairsCommand::List(page) => {
                encode(&client.list_pairs(page.cursor, page.limit).await?, List)
            }
            PairsCommand::Get { pair } => encode(&client.get_pair(&pair).await?, Single),
        },
        Command::Markets(command) => markets(client, command).await,
        Command::Exchanges(command) => match command {
            ExchangesCommand::List => encode(&client.list_exchanges().await?, List),
            ExchangesCommand::Get { exchange } => {
                encode(&client.get_exchange(&exchange).await?, Single)
            }
            ExchangesCommand::Markets { exchange } => {
                encode(&client.list_exchange_markets(&exchange).await?, List)
            }
        },
    }
}

async fn markets(client: &CryptowatchClient, command: MarketsCommand) -> Result<Output, CliError> {
    use Layout::{Grouped, Keyed, List, Single};

    match command {
        MarketsCommand::List(page) => {
            encode(&client.list_markets(page.cursor, page.limit).await?, List)
        }
        MarketsCommand::Get(m) => encode(&client.get_market(&m.exchange, &m.pair).await?, Single),
        MarketsCommand::Price(m) => {
            encode(&client.get_market_price(&m.exchange, &m.pair).await?, Single)
        }
        MarketsCommand::Prices(page) => encode(
            &client.get_all_market_prices(page.cursor, page.limit).await?,
            Keyed("market"),
        ),
        MarketsCommand::Trades {
            market,
            since,
            limit,
        } => encode(
            &client
                .get_market_trades(&market.exchange, &market.pair, since, limit)
                .await?,
            List,
        ),
        MarketsCommand::Summary(m) => encode(
            &client.get_market_summary(&m.exchange, &m.pair).await?,
            Single,
        ),
        MarketsCommand::Summaries { page, key_by } => encode(
            &client
                .get_all_market_summaries(page.cursor, page.limit, key_by)
                .await?,
            Keyed("market"),
        ),
        MarketsCommand::Orderbook {
            market,
            depth,
            span,
            limit,
        } => encode(
            &client
                .get_market_order_book(&market.exchange, &market.pair, depth, span, limit)
                .await?,
            Grouped("side"),
        ),
        MarketsCommand::OrderbookLiquidity(m) => encode(
            &client
                .get_market_order_book_liquidity(&m.exchange, &m.pair)
                .await?,
            Single,
        ),
        MarketsCommand::Calculate { market, amount } => encode(
            &client
                .calculate_quote(&market.exchange, &market.pair, amount)
                .await?,
            Single,
        ),
        MarketsCommand::Ohlcv {
            market,
            before,
            after,
            periods,
            by_label,
        } => {
            let response = client
                .get_ohlcv(&market.exchange, &market.pair, before, after, &periods)
                .await?;
            encode(&ohlcv_response(response, by_label), Grouped("period"))
        }
    }
}

fn ohlcv_response(response: Response<OhlcvResult>, by_label: bool) -> Response<OhlcvResult> {
    if !by_label {
        return response;
    }
    Response {
        result: OhlcvResult(response.result.by_label()),
        allowance: response.allowance,
    }
}

fn render(output: &Output, format: OutputFormat, pretty: bool) -> Result<String, CliError> {
    match format {
        OutputFormat::Json => to_json(&output.wire, pretty),
        OutputFormat::Objects => to_json(&output.result, pretty),
        OutputFormat::Records => {
            let records = rows(&output.result, output.layout)
                .into_iter()
                .map(Value::Object)
                .collect();
            to_json(&Value::Array(records), pretty)
        }
        OutputFormat::Csv => to_csv(&rows(&output.result, output.layout)),
        OutputFormat::Table => Ok(to_table(&rows(&output.result, output.layout))),
    }
}

fn to_json(value: &Value, pretty: bool) -> Result<String, CliError> {
    if pretty {
        Ok(serde_json::to_string_pretty(value)?)
    } else {
        Ok(serde_json::to_string(value)?)
    }
}

type Row = Map<String, Value>;

fn rows(result: &Value, layout: Layout) -> Vec<Row> {
    match (layout, result) {
        (Layout::List, Value::Array(items)) => items.iter().map(flat_row).collect(),
        (Layout::Keyed(column), Value::Object(entries)) => entries
            .iter()
            .map(|(key, item)| {
                let mut row = Row::new();
                row.insert(column.to_string(), Value::String(key.clone()));
                flatten_into(&mut row, "", item);
                row
            })
            .collect(),
        (Layout::Grouped(column), Value::Object(entries)) => {
            let mut shared = Row::new();
            for (key, item) in entries.iter().filter(|(_, item)| !item.is_array()) {
                flatten_into(&mut shared, key, item);
            }
            let mut rows = Vec::new();
            for (key, items) in entries
                .iter()
                .filter_map(|(key, item)| item.as_array().map(|items| (key, items)))
            {
                for item in items {
                    let mut row = Row::new();
                    row.insert(column.to_string(), Value::String(key.clone()));
                    flatten_into(&mut row, "", item);
                    row.extend(shared.clone());
                    rows.push(row);
                }
            }
            rows
        }
        _ => vec![flat_row(result)],
    }
}

fn flat_row(value: &Value) -> Row {
    let mut row = Row::new();
    flatten_into(&mut row, "", value);
    row
}

/// Nested objects become `parent.child` columns; anything else is one cell.
fn flatten_into(row: &mut Row, prefix: &str, value: &Value) {
    match value {
        Value::Object(fields) => {
            for (key, inner) in fields {
                let column = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}.{key}")
                };
                flatten_into(row, &column, inner);
            }
        }
        other if prefix.is_empty() => {
            row.insert("value".to_string(), other.clone());
        }
        other => {
            row.insert(prefix.to_string(), other.clone());
        }
    }
}

/// Column names in first-seen order across all rows.
fn columns(rows: &[Row]) -> Vec<String> {
    let mut columns: Vec<String> = Vec::new();
    for key in rows.iter().flat_map(Map::keys) {
        if !columns.contains(key) {
            columns.push(key.clone());
        }
    }
    columns
}

fn cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
    }
}

fn to_csv(rows: &[Row]) -> Result<String, CliError> {
    let columns = columns(rows);
    if columns.is_empty() {
        return Ok(String::new());
    }
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(&columns)?;
    for row in rows {
        writer.write_record(columns.iter().map(|column| cell(row.get(column))))?;
    }
    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8_lossy(&bytes).trim_end().to_string())
}

fn to_table(rows: &[Row]) -> String {
    let columns = columns(rows);
    let mut builder = tabled::builder::Builder::default();
    builder.push_record(columns.iter().cloned());
    for row in rows {
        builder.push_record(columns.iter().map(|column| cell(row.get(column))));
    }
    let mut table = builder.build();
    table.with(Style::sharp());
    table.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use cwatch_rs::OrderBook;
    use cwatch_rs::conversion::structure;

    const ALLOWANCE: &str = r#"{"cost": 0.015, "remaining": 9.985, "upgrade": "sign up"}"#;

    fn ohlcv() -> Response<OhlcvResult> {
        structure(&format!(
            r#"{{"result": {{"604800_Monday": [[1607040000, 19000.5, 19500, 18800, 19200.25, 12.5, 240000]],
                              "3600": [[1607043600, 19100, 19150, 19050, 19120, 1.5, 28680]]}},
                 "allowance": {ALLOWANCE}}}"#
        ))
        .unwrap()
    }

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("cwatch").chain(args.iter().copied()))
    }

    #[test]
    fn test_parse_ohlcv_periods() {
        let cli = parse(&[
            "markets", "ohlcv", "kraken", "btcusd", "--periods", "1m,3600", "--by-label",
        ])
        .unwrap();
        match cli.command {
            Command::Markets(MarketsCommand::Ohlcv {
                market,
                periods,
                by_label,
                before,
                after,
            }) => {
                assert_eq!(market.exchange, "kraken");
                assert_eq!(market.pair, "btcusd");
                assert_eq!(
                    periods,
                    vec![Period::Label("1m".to_string()), Period::Seconds(3600)]
                );
                assert!(by_label);
                assert_eq!((before, after), (None, None));
            }
            other => panic!("expected ohlcv, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_summary_key() {
        let cli = parse(&["markets", "summaries", "--key-by", "symbols"]).unwrap();
        match cli.command {
            Command::Markets(MarketsCommand::Summaries { key_by, .. }) => {
                assert_eq!(key_by, Some(SummaryKey::Symbols));
            }
            other => panic!("expected summaries, got {:?}", other),
        }

        assert!(parse(&["markets", "summaries", "--key-by", "name"]).is_err());
    }

    #[test]
    fn test_global_flags() {
        let cli = parse(&["info"]).unwrap();
        assert_eq!(cli.format, OutputFormat::Records);
        assert!(!cli.pretty);
        assert_eq!(cli.timeout_secs, 30);

        let cli = parse(&["assets", "list", "--limit", "5", "--format", "csv"]).unwrap();
        assert_eq!(cli.format, OutputFormat::Csv);
        assert!(parse(&["--format", "yaml", "info"]).is_err());
    }

    #[test]
    fn test_records_keep_data_keys() {
        let output = encode(&ohlcv(), Layout::Grouped("period")).unwrap();
        let records: Value =
            serde_json::from_str(&render(&output, OutputFormat::Records, false).unwrap()).unwrap();

        let records = records.as_array().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["period"], "3600");
        assert_eq!(records[1]["period"], "604800_Monday");
        assert_eq!(records[1]["close_time"], 1607040000);
        assert_eq!(records[1]["close_price"], "19200.25");
        assert_eq!(records[1]["quote_volume"], "240000");

        let objects = render(&output, OutputFormat::Objects, false).unwrap();
        assert!(objects.contains("\"604800_Monday\""));
        assert!(!objects.contains("604800_monday"));

        let wire: Value =
            serde_json::from_str(&render(&output, OutputFormat::Json, false).unwrap()).unwrap();
        assert_eq!(wire["result"]["604800_Monday"][0][0], 1607040000);
        assert_eq!(wire["allowance"]["cost"], "0.015");
    }

    #[test]
    fn test_by_label_output() {
        let output = encode(&ohlcv_response(ohlcv(), true), Layout::Grouped("period")).unwrap();
        let periods: Vec<_> = rows(&output.result, output.layout)
            .iter()
            .map(|row| cell(row.get("period")))
            .collect();
        assert_eq!(periods, vec!["1h", "1w_monday"]);
        assert!(output.wire["result"]["1h"].is_array());
    }

    #[test]
    fn test_csv_output() {
        let output = encode(&ohlcv(), Layout::Grouped("period")).unwrap();
        let csv = render(&output, OutputFormat::Csv, false).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(
            lines[0],
            "period,close_time,open_price,high_price,low_price,close_price,volume,quote_volume"
        );
        assert_eq!(lines[1], "3600,1607043600,19100,19150,19050,19120,1.5,28680");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_table_output() {
        let output = encode(&ohlcv(), Layout::Grouped("period")).unwrap();
        let table = render(&output, OutputFormat::Table, false).unwrap();
        assert!(table.contains("close_time"));
        assert!(table.contains("604800_Monday"));
        assert!(table.contains("19200.25"));
    }

    #[test]
    fn test_grouped_rows_repeat_scalars() {
        let book: Response<OrderBook> = structure(&format!(
            r#"{{"result": {{"asks": [[101.5, 2]], "bids": [[100, 1], [99.5, 3]], "seqNum": 42}},
                 "allowance": {ALLOWANCE}}}"#
        ))
        .unwrap();
        let output = encode(&book, Layout::Grouped("side")).unwrap();
        let rows = rows(&output.result, output.layout);

        assert_eq!(rows.len(), 3);
        assert_eq!(
            columns(&rows),
            vec!["side", "price", "amount", "seq_num"]
        );
        assert_eq!(cell(rows[0].get("side")), "asks");
        assert_eq!(cell(rows[2].get("price")), "99.5");
        assert_eq!(cell(rows[2].get("seq_num")), "42");
    }

    #[test]
    fn test_keyed_and_nested_rows() {
        let prices = structure::<Value>(r#"{"market:kraken:btcUSD": "15940.1"}"#).unwrap();
        let rows = rows(&prices, Layout::Keyed("market"));
        assert_eq!(cell(rows[0].get("market")), "market:kraken:btcUSD");
        assert_eq!(cell(rows[0].get("value")), "15940.1");

        let summary = serde_json::json!({"price": {"last": "1", "change": {"absolute": "0.1"}}, "volume": "10"});
        let row = flat_row(&summary);
        assert_eq!(
            columns(&[row]),
            vec!["price.last", "price.change.absolute", "volume"]
        );
    }

    #[test]
    fn test_empty_list_renders_empty() {
        let output = Output {
            wire: Value::Array(Vec::new()),
            result: Value::Array(Vec::new()),
            layout: Layout::List,
        };
        assert_eq!(render(&output, OutputFormat::Csv, false).unwrap(), "");
        assert_eq!(render(&output, OutputFormat::Records, false).unwrap(), "[]");
    }

    #[test]
    fn test_exit_codes() {
        let input = CliError::from(CryptowatchError::InvalidPeriod("5s".to_string()));
        assert_eq!(input.exit_code(), 2);
        let key = CliError::from(CryptowatchError::ApiKey("empty".to_string()));
        assert_eq!(key.exit_code(), 2);
        let config = CliError::from(CryptowatchError::Config("bad url".to_string()));
        assert_eq!(config.exit_code(), 1);
        let io = CliError::from(std::io::Error::other("closed"));
        assert_eq!(io.exit_code(), 10);
    }
}
