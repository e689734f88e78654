use enc_bloom::errors::Result;
use enc_bloom::{BloomFilter, EncBloomParams, Outcome, QueryMode};

use num_bigint::BigUint;

use std::collections::BTreeSet;
use std::sync::Once;

static INIT: Once = Once::new();

fn init_logging() {
    INIT.call_once(|| {
        let _ = env_logger::builder().is_test(true).try_init();
    });
}

const OWNER_SET: [&str; 5] = [
    "alice@example.com",
    "bob@example.com",
    "carol@example.com",
    "dave@example.com",
    "erin@example.com",
];

const QUERIER_SET: [&str; 4] = [
    "bob@example.com",
    "erin@example.com",
    "mallory@example.com",
    "trent@example.com",
];

fn owner_filter() -> Result<BloomFilter> {
    let mut filter = BloomFilter::with_rate(OWNER_SET.len(), 0.0001)?;
    for item in OWNER_SET {
        filter.insert(item.as_bytes());
    }
    Ok(filter)
}

fn decode(value: &BigUint) -> String {
    String::from_utf8_lossy(&value.to_bytes_be()).into_owned()
}

#[test]
fn showcase_set_union() -> Result<()> {
    init_logging();

    let params = EncBloomParams::try_with(256, QueryMode::Union)?;
    let (engine, owner) = params.setup(owner_filter()?)?;

    // querier side: only the public key is involved
    for item in QUERIER_SET {
        engine.query(item.as_bytes())?;
    }

    // owner side
    let additions: BTreeSet<String> = owner
        .union_additions(&engine.log())?
        .iter()
        .map(decode)
        .collect();

    dbg!(&additions);
    assert_eq!(
        additions,
        BTreeSet::from(["mallory@example.com".to_string(), "trent@example.com".to_string()])
    );
    Ok(())
}

#[test]
fn showcase_set_intersection() -> Result<()> {
    init_logging();

    let params = EncBloomParams::parse(256, "intersection")?;
    let (engine, owner) = params.setup(owner_filter()?)?;

    for item in QUERIER_SET {
        engine.query(item.as_bytes())?;
    }

    let common: Vec<String> = engine
        .log()
        .iter()
        .map(|pair| owner.interpret(params.mode, pair))
        .collect::<Result<Vec<_>>>()?
        .into_iter()
        .filter_map(|outcome| match outcome {
            Outcome::Common(v) => Some(decode(&v)),
            _ => None,
        })
        .collect();

    assert_eq!(common, vec!["bob@example.com", "erin@example.com"]);
    Ok(())
}

#[test]
fn showcase_intersection_cardinality() -> Result<()> {
    init_logging();

    let params = EncBloomParams::try_with(256, QueryMode::Cardinality)?;
    let (engine, owner) = params.setup(owner_filter()?)?;

    for item in QUERIER_SET {
        engine.query(item.as_bytes())?;
    }

    assert_eq!(owner.tally(&engine.log())?, 2);
    Ok(())
}
