use crate::formatter::{numeric_table, print_heading, print_warning};
use pagehash::{ExperimentResults, Series};

/// Prints the space and effort comparison tables plus the growth analysis.
pub fn print_report(results: &ExperimentResults, record_counts: &[usize]) {
    let samples = results.extensible.len();
    if record_counts.len() != samples {
        print_warning(&format!(
            "{} record counts given for {} samples; rows are labelled by position",
            record_counts.len(),
            samples
        ));
    }
    let labels: Vec<String> = (0..samples)
        .map(|i| match record_counts.get(i) {
            Some(n) => n.to_string(),
            None => format!("#{}", i + 1),
        })
        .collect();

    let mut header = vec!["n".to_string(), "Ext.".to_string()];
    header.extend(results.linear.iter().map(|(alpha, _)| format!("Lin({})", alpha)));
    let header: Vec<&str> = header.iter().map(String::as_str).collect();

    print_heading("1. Space required (pages + directory entries)");
    println!("{}", numeric_table(&header, &rows(results, &labels, |s, i| s.space.get(i).map(|v| v.to_string()))));

    print_heading("2. Insertion effort (page I/O)");
    println!("{}", numeric_table(&header, &rows(results, &labels, |s, i| s.effort.get(i).map(|v| v.to_string()))));

    print_growth(results, &labels);
    print_alpha_ratios(results, &labels);
}

fn rows<F>(results: &ExperimentResults, labels: &[String], value: F) -> Vec<Vec<String>>
where
    F: Fn(&Series, usize) -> Option<String>,
{
    labels
        .iter()
        .enumerate()
        .map(|(i, label)| {
            let mut row = vec![label.clone(), value(&results.extensible, i).unwrap_or_default()];
            row.extend(results.linear.iter().map(|(_, series)| value(series, i).unwrap_or_default()));
            row
        })
        .collect()
}

fn print_growth(results: &ExperimentResults, labels: &[String]) {
    if labels.len() < 2 {
        return;
    }

    let mut header = vec!["n".to_string(), "Ext.".to_string()];
    header.extend(results.linear.iter().map(|(alpha, _)| format!("Lin({})", alpha)));
    let header: Vec<&str> = header.iter().map(String::as_str).collect();

    let ext = results.extensible.space_growth();
    let linear: Vec<Vec<f64>> = results.linear.iter().map(|(_, s)| s.space_growth()).collect();

    let rows: Vec<Vec<String>> = (1..labels.len())
        .map(|i| {
            let mut row = vec![labels[i].clone(), ratio(ext.get(i))];
            row.extend(linear.iter().map(|g| ratio(g.get(i))));
            row
        })
        .collect();

    print_heading(&format!("Space growth relative to n={}", labels[0]));
    println!("{}", numeric_table(&header, &rows));
}

fn print_alpha_ratios(results: &ExperimentResults, labels: &[String]) {
    let pairs = results.linear.adjacent_space_ratios();
    if pairs.is_empty() {
        return;
    }

    let mut header = vec!["n".to_string()];
    header.extend(pairs.iter().map(|p| format!("α({})/α({})", p.lower, p.upper)));
    let header: Vec<&str> = header.iter().map(String::as_str).collect();

    let rows: Vec<Vec<String>> = labels
        .iter()
        .enumerate()
        .map(|(i, label)| {
            let mut row = vec![label.clone()];
            row.extend(pairs.iter().map(|p| ratio(p.ratios.get(i))));
            row
        })
        .collect();

    print_heading("Effect of alpha_max on linear hashing space");
    println!("{}", numeric_table(&header, &rows));
}

fn ratio(value: Option<&f64>) -> String {
    value.map(|v| format!("{:.2}x", v)).unwrap_or_default()
}
