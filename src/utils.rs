use std::path::PathBuf;

/// Get data directory (ticker lists and state files) from environment variable or use default
pub fn get_data_dir() -> PathBuf {
    std::env::var("DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("data"))
}

/// Get output directory for the rendered dashboard
pub fn get_output_dir() -> PathBuf {
    std::env::var("OUTPUT_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
}

/// Compact volume/notional: 1.2K, 3.4M, 5.6B
pub fn format_number(n: Option<f64>) -> String {
    match n {
        Some(n) if n.is_finite() => {
            let abs = n.abs();
            if abs >= 1_000_000_000.0 {
                format!("{:.1}B", n / 1_000_000_000.0)
            } else if abs >= 1_000_000.0 {
                format!("{:.1}M", n / 1_000_000.0)
            } else if abs >= 1_000.0 {
                format!("{:.1}K", n / 1_000.0)
            } else {
                format!("{:.0}", n)
            }
        }
        _ => "N/A".to_string(),
    }
}

/// Dollar price with thousands separators: $1,234.56
pub fn format_price(p: Option<f64>) -> String {
    match p {
        Some(p) if p.is_finite() => {
            let sign = if p < 0.0 { "-" } else { "" };
            format!("{}${}", sign, format_grouped(Some(p.abs())))
        }
        _ => "N/A".to_string(),
    }
}

/// Plain value with thousands separators and two decimals: 5,283.40
pub fn format_grouped(p: Option<f64>) -> String {
    match p {
        Some(p) if p.is_finite() => {
            let fixed = format!("{:.2}", p.abs());
            let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
            let sign = if p < 0.0 { "-" } else { "" };
            format!("{}{}.{}", sign, group_thousands(int_part), frac_part)
        }
        _ => "N/A".to_string(),
    }
}

/// Signed percentage: +1.23%
pub fn format_pct(p: Option<f64>) -> String {
    match p {
        Some(p) if p.is_finite() => format!("{:+.2}%", p),
        _ => "N/A".to_string(),
    }
}

fn group_thousands(digits: &str) -> String {
    let mut result = String::new();
    for (i, c) in digits.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.insert(0, ',');
        }
        result.insert(0, c);
    }
    result
}
