//! # Studio Notebook
//!
//! The Zeppelin note shipped as the code content of a Studio application. It registers a
//! ticker UDF, declares a Kafka-backed `stock_table` and starts a datagen job feeding it.

use crate::constants::{NOTEBOOK_NOTE_ID, TICKERS};
use serde::Serialize;

/// Zeppelin release the note format targets
const NOTE_FORMAT_VERSION: &str = "0.9.0-rc1-kda1";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParagraphConfig {
    /// Zeppelin expects the flag as a string
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Paragraph {
    pub text: String,
    pub title: String,
    pub config: ParagraphConfig,
}

impl Paragraph {
    fn titled(title: &str, text: String) -> Self {
        Self {
            text,
            title: format!(r##"<h3><font  color="#3071A9">{title}</font></h3>"##),
            config: ParagraphConfig {
                title: "true".to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub paragraphs: Vec<Paragraph>,
    pub name: String,
    pub id: String,
    pub default_interpreter_group: String,
    pub version: String,
    pub path: String,
}

/// Where the note's source table reads from
#[derive(Debug, Clone, Copy)]
pub struct KafkaSource<'a> {
    pub bootstrap_servers: &'a str,
    pub topic: &'a str,
}

fn ticker_udf() -> String {
    let tickers = TICKERS
        .iter()
        .map(|t| format!("\"{t}\""))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "%flink \n\n\
         class RandomTickerUDF extends ScalarFunction {{\n\
         \x20 private val randomStrings: List[String] = List({tickers})\n\
         \x20   private val random: scala.util.Random = new scala.util.Random(System.nanoTime())\n\n\
         \x20 override def isDeterministic(): Boolean = {{\n\
         \x20     return false;\n\
         \x20 }}\n\n\
         \x20 def eval(): String = {{\n\
         \x20       val randomIndex = random.nextInt(randomStrings.length)\n\
         \x20       randomStrings(randomIndex)\n\
         \x20   }}\n\
         }}\n\n\
         stenv.registerFunction(\"random_ticker_udf\", new RandomTickerUDF())"
    )
}

fn stock_table(source: KafkaSource<'_>) -> String {
    format!(
        "%flink.ssql(type=update)\n\
         DROP TABLE IF EXISTS stock_table;\n\
         CREATE TABLE stock_table (\n\
         \x20 ticker STRING,\n\
         \x20 event_time TIMESTAMP(3),\n\
         \x20 price DOUBLE,\n\
         \x20 WATERMARK for event_time as event_time - INTERVAL '15' SECONDS\n\
         ) WITH (\n\
         \x20 'connector' = 'kafka',\n\
         \x20 'topic' = '{topic}',\n\
         \x20 'properties.bootstrap.servers' = '{servers}',\n\
         \x20 'properties.security.protocol' = 'SASL_SSL',\n\
         \x20 'properties.sasl.mechanism' = 'AWS_MSK_IAM',\n\
         \x20 'properties.sasl.jaas.config' = 'software.amazon.msk.auth.iam.IAMLoginModule required;',\n\
         \x20 'properties.sasl.client.callback.handler.class' = 'software.amazon.msk.auth.iam.IAMClientCallbackHandler',\n\
         \x20 'properties.group.id' = 'myGroup',\n\
         \x20 'scan.startup.mode' = 'earliest-offset',\n\
         \x20 'format' = 'json'\n\
         );\n\n\n\
         SELECT * FROM stock_table;",
        topic = source.topic,
        servers = source.bootstrap_servers,
    )
}

fn datagen_insert() -> String {
    "%flink.ssql(parallelism=1)\n\
     DROP TABLE IF EXISTS generate_stock_data;\n\
     CREATE TABLE generate_stock_data(\n\
     \x20 ticker STRING,\n\
     \x20 event_time TIMESTAMP(3),\n\
     \x20 price DOUBLE\n\
     )\n\
     WITH (\n\
     \x20   'connector' = 'datagen',\n\
     \x20   'fields.price.kind' = 'random',\n\
     \x20   'fields.price.min' ='0.00',\n\
     \x20   'fields.price.max' = '1000.00'\n\
     );\n\n\n\
     INSERT INTO stock_table \n\
     SELECT random_ticker_udf() as ticker, event_time, price from generate_stock_data;"
        .to_string()
}

impl Note {
    /// The blueprint note for an application
    #[must_use]
    pub fn blueprint(app_name: &str, source: KafkaSource<'_>) -> Self {
        Self {
            paragraphs: vec![
                Paragraph::titled(
                    "1) User Defined Function for generating stock ticker data",
                    ticker_udf(),
                ),
                Paragraph::titled(
                    "2) Defining a source table to source MSK topic and querying data",
                    stock_table(source),
                ),
                Paragraph::titled(
                    "3) Please run this paragraph before running any additional event_time based queries in order to generate new data into the MSF topic",
                    datagen_insert(),
                ),
            ],
            name: app_name.to_string(),
            id: NOTEBOOK_NOTE_ID.to_string(),
            default_interpreter_group: "flink".to_string(),
            version: NOTE_FORMAT_VERSION.to_string(),
            path: format!("/{app_name}"),
        }
    }

    /// Render the note as the JSON text the service stores
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
