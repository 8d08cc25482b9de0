//! Writes a synthetic vehicle-sales CSV for trying out the explorer.
//!
//! Usage: `generate_sample [OUTPUT] [ROWS]` (defaults: `car_prices_sample.csv`, 500).

use anyhow::{Context, Result};
use chrono::NaiveDate;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn below(&mut self, n: usize) -> usize {
        (self.next_u64() % n as u64) as usize
    }

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[self.below(items.len())]
    }
}

/// (make, models, base price)
const MAKES: &[(&str, &[&str], f64)] = &[
    ("Toyota", &["Camry", "Corolla", "RAV4"], 24000.0),
    ("Honda", &["Accord", "Civic", "CR-V"], 23000.0),
    ("Ford", &["F-150", "Fusion", "Escape"], 26000.0),
    ("BMW", &["3 Series", "5 Series", "X5"], 42000.0),
    ("Kia", &["Optima", "Sorento", "Soul"], 19000.0),
];
const BODIES: &[&str] = &["Sedan", "SUV", "Pickup", "Hatchback"];
const STATES: &[&str] = &["ca", "fl", "tx", "pa", "ga"];
const COLORS: &[&str] = &["black", "white", "silver", "gray", "blue", "red"];
const OFFSETS: &[&str] = &["-0800", "-0700", "-0500"];

fn main() -> Result<()> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let output_path = args.next().unwrap_or_else(|| "car_prices_sample.csv".to_string());
    let rows: usize = match args.next() {
        Some(n) => n.parse().with_context(|| format!("invalid row count: {n}"))?,
        None => 500,
    };

    let mut rng = SimpleRng::new(42);
    let mut writer = csv::Writer::from_path(&output_path)
        .with_context(|| format!("creating {output_path}"))?;
    writer.write_record([
        "year",
        "make",
        "model",
        "body",
        "transmission",
        "vin",
        "state",
        "condition",
        "odometer",
        "color",
        "sellingprice",
        "saledate",
    ])?;

    for i in 0..rows {
        let (make, models, base) = MAKES[rng.below(MAKES.len())];
        let year = 2000 + rng.below(16);
        let age = (2015 - year) as f64;
        let odometer = (age * 12000.0 + rng.next_f64() * 20000.0).round();
        let price = (base * 0.88f64.powf(age) * (0.85 + rng.next_f64() * 0.3) / 25.0).round() * 25.0;

        // Roughly one row in twenty has a gap, as in the real export.
        let condition = if rng.below(20) == 0 {
            String::new()
        } else {
            (10 + rng.below(40)).to_string()
        };
        let transmission = if rng.below(10) == 0 { "manual" } else { "automatic" };

        // Same shape as the raw export: "Tue Dec 16 2014 12:30:00 GMT-0800 (PST)"
        let (y, m, d) = (2014 + rng.below(2), 1 + rng.below(12), 1 + rng.below(28));
        let sold = NaiveDate::from_ymd_opt(y as i32, m as u32, d as u32)
            .and_then(|d| d.and_hms_opt(rng.below(24) as u32, 30, 0))
            .context("building sale date")?;
        let saledate = format!(
            "{} GMT{} (LOCAL)",
            sold.format("%a %b %d %Y %H:%M:%S"),
            rng.pick(OFFSETS),
        );

        writer.write_record([
            year.to_string(),
            make.to_string(),
            rng.pick(models).to_string(),
            rng.pick(BODIES).to_string(),
            transmission.to_string(),
            format!("{:017X}", rng.next_u64() ^ i as u64),
            rng.pick(STATES).to_string(),
            condition,
            odometer.to_string(),
            rng.pick(COLORS).to_string(),
            price.to_string(),
            saledate,
        ])?;
    }
    writer.flush().context("flushing output")?;

    log::info!("Wrote {rows} sales to {output_path}");
    println!("Wrote {rows} sales to {output_path}");
    Ok(())
}
