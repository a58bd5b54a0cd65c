//! Add a tag to every document matching a filter.
//!
//! Usage: add_tag <index-file> <tag> [filter]

use anyhow::Context;
use serde_json::{json, Value};
use sist2_index::{print_progress, Sist2Index};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut args = std::env::args().skip(1);
    let usage = "usage: add_tag <index-file> <tag> [filter]";
    let index_path = args.next().context(usage)?;
    let tag = args.next().context(usage)?;
    let filter = args.next().unwrap_or_default();

    let index = Sist2Index::open(&index_path)?;
    let count = index.document_count(&filter)?;
    println!(
        "Tagging {} document(s) in '{}'",
        count,
        index.descriptor().name
    );

    let mut done = 0;
    for doc in index.documents(&filter) {
        let mut doc = doc?;

        let tags = doc
            .json_data
            .entry("tag".to_string())
            .or_insert_with(|| json!([]));
        if let Value::Array(tags) = tags {
            if !tags.iter().any(|t| t.as_str() == Some(tag.as_str())) {
                tags.push(json!(tag));
            }
        }
        index.update_document(&doc)?;

        done += 1;
        print_progress(done, count, false);
    }

    index.sync_tag_table()?;
    index.commit()?;
    println!("Done.");

    Ok(())
}
