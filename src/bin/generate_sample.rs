use anyhow::Context;

use econ_atlas::data::loader::RENAME_TABLE;

/// Minimal deterministic PRNG (splitmix64).
struct SampleRng {
    state: u64,
}

impl SampleRng {
    fn new(seed: u64) -> Self {
        SampleRng { state: seed }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Uniform in [-spread, spread].
    fn jitter(&mut self, spread: f64) -> f64 {
        (self.next_f64() - 0.5) * 2.0 * spread
    }
}

struct Country {
    id: u32,
    name: &'static str,
    currency: &'static str,
    /// Starting GDP in USD, 1970.
    gdp0: f64,
    /// Mean annual growth rate.
    growth: f64,
    /// Starting population, 1970.
    pop0: f64,
    /// Local-currency units per USD.
    fx: f64,
}

const COUNTRIES: &[Country] = &[
    Country { id: 840, name: "United States", currency: "US Dollar", gdp0: 1.07e12, growth: 0.028, pop0: 2.05e8, fx: 1.0 },
    Country { id: 156, name: "China", currency: "Yuan Renminbi", gdp0: 9.2e10, growth: 0.085, pop0: 8.2e8, fx: 6.5 },
    Country { id: 392, name: "Japan", currency: "Yen", gdp0: 2.1e11, growth: 0.025, pop0: 1.04e8, fx: 110.0 },
    Country { id: 276, name: "Germany", currency: "Euro", gdp0: 2.2e11, growth: 0.022, pop0: 7.8e7, fx: 0.9 },
    Country { id: 356, name: "India", currency: "Indian Rupee", gdp0: 6.2e10, growth: 0.055, pop0: 5.5e8, fx: 74.0 },
    Country { id: 826, name: "United Kingdom", currency: "Pound Sterling", gdp0: 1.3e11, growth: 0.021, pop0: 5.6e7, fx: 0.78 },
    Country { id: 250, name: "France", currency: "Euro", gdp0: 1.5e11, growth: 0.021, pop0: 5.1e7, fx: 0.9 },
    Country { id: 76, name: "Brazil", currency: "Brazilian Real", gdp0: 4.2e10, growth: 0.035, pop0: 9.5e7, fx: 5.2 },
    Country { id: 380, name: "Italy", currency: "Euro", gdp0: 1.1e11, growth: 0.018, pop0: 5.4e7, fx: 0.9 },
    Country { id: 124, name: "Canada", currency: "Canadian Dollar", gdp0: 8.8e10, growth: 0.024, pop0: 2.1e7, fx: 1.3 },
    Country { id: 643, name: "Russian Federation", currency: "Russian Ruble", gdp0: 8.0e10, growth: 0.02, pop0: 1.3e8, fx: 73.0 },
    Country { id: 36, name: "Australia", currency: "Australian Dollar", gdp0: 4.1e10, growth: 0.027, pop0: 1.2e7, fx: 1.4 },
    Country { id: 724, name: "Spain", currency: "Euro", gdp0: 4.0e10, growth: 0.023, pop0: 3.4e7, fx: 0.9 },
    Country { id: 484, name: "Mexico", currency: "Mexican Peso", gdp0: 3.9e10, growth: 0.028, pop0: 5.1e7, fx: 20.0 },
    Country { id: 360, name: "Indonesia", currency: "Rupiah", gdp0: 9.0e9, growth: 0.05, pop0: 1.15e8, fx: 14300.0 },
    Country { id: 528, name: "Netherlands", currency: "Euro", gdp0: 3.7e10, growth: 0.022, pop0: 1.3e7, fx: 0.9 },
];

const YEARS: std::ops::RangeInclusive<i32> = 1970..=2021;

/// Sector weights over total value added: agriculture, mining/manufacturing/
/// utilities, construction, trade, transport, other (sums to 1).
const SECTOR_WEIGHTS: [f64; 6] = [0.08, 0.22, 0.06, 0.16, 0.10, 0.38];

fn main() -> anyhow::Result<()> {
    let mut rng = SampleRng::new(7);

    let output_path = "sample_indicators.csv";
    let mut wtr = csv::Writer::from_path(output_path)
        .with_context(|| format!("creating {output_path}"))?;

    wtr.write_record(RENAME_TABLE.iter().map(|(source, _)| *source))?;

    let mut n_rows = 0usize;
    for country in COUNTRIES {
        let mut gdp = country.gdp0;
        let mut pop = country.pop0;
        let mut fx = country.fx;

        for year in YEARS {
            gdp *= 1.0 + country.growth + rng.jitter(0.02);
            pop *= 1.01 + rng.jitter(0.004);
            fx *= 1.0 + rng.jitter(0.03);

            let tva = gdp * 0.92;
            let mut sectors: Vec<f64> = SECTOR_WEIGHTS
                .iter()
                .map(|w| w * (1.0 + rng.jitter(0.15)))
                .collect();
            let weight_sum: f64 = sectors.iter().sum();
            for s in &mut sectors {
                *s = *s / weight_sum * tva;
            }

            let household = gdp * (0.55 + rng.jitter(0.03));
            let gov = gdp * (0.18 + rng.jitter(0.02));
            let gcf = gdp * (0.23 + rng.jitter(0.03));
            let gfcf = gcf * 0.95;
            let exports = gdp * (0.25 + rng.jitter(0.08));
            let imports = gdp * (0.25 + rng.jitter(0.08));
            let gni = gdp * (0.99 + rng.jitter(0.015));

            // A few blank cells so loads exercise the fill-with-zero path.
            let inventories = if rng.next_f64() < 0.03 {
                String::new()
            } else {
                num(gcf - gfcf)
            };

            let cell = |canonical: &str| -> String {
                match canonical {
                    "country_id" => country.id.to_string(),
                    "country" => country.name.to_string(),
                    "year" => year.to_string(),
                    "currency" => country.currency.to_string(),
                    "ama_exchange_rate" => num(fx),
                    "imf_exchange_rate" => num(fx * 1.002),
                    "population" => num(pop.round()),
                    "per_capita_gni" => num(gni / pop),
                    "agr_hunt_forest_fish_gva" => num(sectors[0]),
                    "changes_in_inventories" => inventories.clone(),
                    "construction_gva" => num(sectors[2]),
                    "exports" => num(exports),
                    "final_consumption_expenditure" => num(household + gov),
                    "gov_final_consumption_expenditure" => num(gov),
                    "gross_capital_formation" => num(gcf),
                    "gross_fixed_capital_formation" => num(gfcf),
                    "household_consumption_expenditure" => num(household),
                    "imports" => num(imports),
                    "manufacturing_gva" => num(sectors[1] * 0.6),
                    "mining_manufacturing_utilities_gva" => num(sectors[1]),
                    "other_activities_gva" => num(sectors[5]),
                    "total_value_added" => num(tva),
                    "transport_storage_comm_gva" => num(sectors[4]),
                    "wholesale_retail_trade_gva" => num(sectors[3]),
                    "gni_usd" => num(gni),
                    "gdp" => num(gdp),
                    other => unreachable!("unmapped canonical field {other}"),
                }
            };

            let row: Vec<String> = RENAME_TABLE
                .iter()
                .map(|(_, canonical)| cell(canonical))
                .collect();
            wtr.write_record(&row)?;
            n_rows += 1;
        }
    }

    wtr.flush()?;
    println!(
        "Wrote {n_rows} rows ({} countries, {}..={}) to {output_path}",
        COUNTRIES.len(),
        YEARS.start(),
        YEARS.end()
    );
    Ok(())
}

fn num(v: f64) -> String {
    format!("{v:.4}")
}
