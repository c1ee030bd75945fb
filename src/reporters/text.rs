//! Delimited-text renderers for the two report families.

use super::{DescriptiveBlock, InferentialRow};
use crate::stats::Describe;

pub const DESCRIPTIVE_HEADER: &str = "age,n,range,mean (sd),median,mode (count),skewness,kurtosis";
pub const INFERENTIAL_HEADER: &str = "cell,n,df_model,df_resid,F,p,R2 (CI)";

/// Render descriptive blocks: label line, header, one row per age, the
/// cross-age average row, then a blank separator.
pub fn render_descriptive(blocks: &[DescriptiveBlock]) -> String {
    let mut out = String::new();
    for block in blocks {
        out.push_str(&block.label);
        out.push('\n');
        out.push_str(DESCRIPTIVE_HEADER);
        out.push('\n');
        for (age, stats) in &block.rows {
            out.push_str(&describe_row(age, stats));
            out.push('\n');
        }
        out.push_str(&describe_row("average", &block.average));
        out.push_str("\n\n");
    }
    out
}

/// Render inferential rows under the shared header. Values carry five
/// decimals, matching the precision the study reports R-squared at.
pub fn render_inferential(rows: &[InferentialRow]) -> String {
    let mut out = String::new();
    out.push_str(INFERENTIAL_HEADER);
    out.push('\n');
    for row in rows {
        match row {
            InferentialRow::Fitted {
                label,
                result,
                ci_lower,
                ci_upper,
            } => {
                out.push_str(&format!(
                    "{label},{},{},{},{:.5},{:.5},{:.5} ({:.5}-{:.5})\n",
                    result.nobs,
                    result.df_model,
                    result.df_resid,
                    result.f_statistic,
                    result.f_pvalue,
                    result.r_squared,
                    ci_lower,
                    ci_upper,
                ));
            }
            InferentialRow::Failed { label, reason } => {
                out.push_str(&format!("{label},error: {reason}\n"));
            }
        }
    }
    out
}

fn describe_row(age: &str, d: &Describe) -> String {
    format!(
        "{age},{},{} to {},{} ({}),{},{} ({}),{},{}",
        fmt_stat(d.nobs),
        fmt_stat(d.min),
        fmt_stat(d.max),
        fmt_stat(d.mean),
        fmt_stat(d.std),
        fmt_stat(d.median),
        fmt_stat(d.mode),
        fmt_stat(d.mode_count),
        fmt_stat(d.skewness),
        fmt_stat(d.kurtosis),
    )
}

/// Integer values print without a decimal point; everything else rounds to
/// two places, or four when two places would show only zeros.
pub fn fmt_stat(v: f64) -> String {
    if v.is_nan() {
        return "NaN".to_string();
    }
    if v.is_infinite() {
        return if v > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    if v == v.trunc() {
        return format!("{v:.0}");
    }
    let two = (v * 100.0).round() / 100.0;
    if two == 0.0 {
        format!("{v:.4}")
    } else {
        format!("{v:.2}")
    }
}
