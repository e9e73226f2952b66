//! Number rendering for the table and the alignment report.

/// How floating point values are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NumberStyle {
    /// Shortest round-trip form (`90.0`, `0.25`, `1e-05`)
    #[default]
    Plain,
    /// E-values and bit scores as NCBI BLAST prints them in tabular reports
    Ncbi,
}

impl NumberStyle {
    pub fn evalue(self, e_value: f64) -> String {
        match self {
            NumberStyle::Plain => format_plain(e_value),
            NumberStyle::Ncbi => format_evalue_ncbi_tabular(e_value),
        }
    }

    pub fn bit_score(self, bit_score: f64) -> String {
        match self {
            NumberStyle::Plain => format_plain(bit_score),
            NumberStyle::Ncbi => format_bitscore_ncbi(bit_score),
        }
    }

    /// Percentages are always plain so threshold comparisons stay readable.
    pub fn percent(self, value: f64) -> String {
        format_plain(value)
    }
}

/// Shortest representation that parses back to the same value.
///
/// Integral values keep one decimal (`100.0`); magnitudes below 1e-4 or at
/// least 1e16 switch to exponent form.
pub fn format_plain(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let magnitude = value.abs();
    if magnitude != 0.0 && !(1e-4..1e16).contains(&magnitude) {
        pad_exponent(format!("{:e}", value))
    } else if value.fract() == 0.0 {
        format!("{:.1}", value)
    } else {
        format!("{}", value)
    }
}

/// Scientific notation with a signed, at least two digit exponent (`1.00e-05`).
fn format_scientific_ncbi(value: f64, precision: usize) -> String {
    pad_exponent(format!("{:.*e}", precision, value))
}

/// `1e-5` -> `1e-05`, `1e16` -> `1e+16`.
fn pad_exponent(mut raw: String) -> String {
    let exp_pos = match raw.find('e') {
        Some(pos) => pos,
        None => return raw,
    };

    let mut digits_start = exp_pos + 1;
    if raw.as_bytes().get(digits_start) == Some(&b'-') {
        digits_start += 1;
    } else {
        raw.insert(digits_start, '+');
        digits_start += 1;
    }

    if raw.len() - digits_start < 2 {
        raw.insert(digits_start, '0');
    }
    raw
}

/// E-value as in NCBI's `GetScoreString`.
pub fn format_evalue_ncbi(e_value: f64) -> String {
    if e_value < 1.0e-180 {
        "0.0".to_string()
    } else if e_value < 0.0009 {
        format_scientific_ncbi(e_value, 0)
    } else if e_value < 0.1 {
        format!("{:.3}", e_value)
    } else if e_value < 1.0 {
        format!("{:.2}", e_value)
    } else if e_value < 10.0 {
        format!("{:.1}", e_value)
    } else {
        format!("{:.0}", e_value)
    }
}

/// E-value as in NCBI's tabular output: small values keep two decimals.
pub fn format_evalue_ncbi_tabular(e_value: f64) -> String {
    if e_value < 1.0e-180 {
        "0.0".to_string()
    } else if e_value < 0.0009 {
        format_scientific_ncbi(e_value, 2)
    } else {
        format_evalue_ncbi(e_value)
    }
}

pub fn format_bitscore_ncbi(bit_score: f64) -> String {
    if bit_score > 99999.0 {
        format_scientific_ncbi(bit_score, 3)
    } else if bit_score > 99.9 {
        format!("{:.0}", bit_score.trunc())
    } else {
        format!("{:.1}", bit_score)
    }
}
