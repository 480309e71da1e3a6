/// Format a figure with Indian digit grouping and two decimals: 12,34,567.89
pub fn figure(val: f64) -> String {
    let negative = val < 0.0;
    let fixed = format!("{:.2}", val.abs());
    let (int_part, dec_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    // Last three digits stand alone, the rest group in pairs.
    let grouped = if int_part.len() <= 3 {
        int_part.to_string()
    } else {
        let (head, tail) = int_part.split_at(int_part.len() - 3);
        let mut pairs = Vec::new();
        let mut rest = head;
        while rest.len() > 2 {
            let (h, t) = rest.split_at(rest.len() - 2);
            pairs.push(t);
            rest = h;
        }
        pairs.push(rest);
        pairs.reverse();
        format!("{},{tail}", pairs.join(","))
    };

    if negative && fixed != "0.00" {
        format!("-{grouped}.{dec_part}")
    } else {
        format!("{grouped}.{dec_part}")
    }
}

/// Unit suffix for a scorecard row.
pub fn unit_label(is_total: bool) -> &'static str {
    if is_total {
        "Cr"
    } else {
        "L"
    }
}
