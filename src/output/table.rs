use unicode_width::UnicodeWidthStr;

use crate::db::models::*;
use crate::filter::ConditionResult;

/// Truncate a string to fit within max_width (respecting unicode width).
fn truncate(s: &str, max_width: usize) -> String {
    if UnicodeWidthStr::width(s) <= max_width {
        return s.to_string();
    }
    let mut result = String::new();
    let mut width = 0;
    for ch in s.chars() {
        let cw = unicode_width::UnicodeWidthChar::width(ch).unwrap_or(0);
        if width + cw + 3 > max_width {
            result.push_str("...");
            break;
        }
        result.push(ch);
        width += cw;
    }
    result
}

fn plural(n: usize) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}

/// Format a byte count for humans.
pub fn format_bytes(bytes: u64) -> String {
    if bytes >= 1_073_741_824 {
        format!("{:.1} GB", bytes as f64 / 1_073_741_824.0)
    } else if bytes >= 1_048_576 {
        format!("{:.1} MB", bytes as f64 / 1_048_576.0)
    } else if bytes >= 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{bytes} B")
    }
}

/// Print labelled totals with a grand total line.
pub fn print_totals(heading: &str, totals: &[Total]) {
    if totals.is_empty() {
        println!("No {heading} in this period");
        return;
    }

    println!("  {:<30} {:>14}", heading.to_uppercase(), "TOTAL");
    println!("  {}", "-".repeat(45));
    let mut sum = 0.0;
    for t in totals {
        println!("  {:<30} {:>14.2}", truncate(&t.key, 30), t.total);
        sum += t.total;
    }
    println!("  {}", "-".repeat(45));
    println!("  {:<30} {:>14.2}", "", sum);
}

pub fn print_leads(leads: &[LeadCount]) {
    if leads.is_empty() {
        println!("No leads in this period");
        return;
    }
    println!("  {:<10} {:>8}", "BRANCH", "LEADS");
    println!("  {}", "-".repeat(19));
    for l in leads {
        println!("  {:<10} {:>8}", l.branch_id, l.count);
    }
}

pub fn print_trend(days: &[DailyTotal]) {
    if days.is_empty() {
        println!("No sales in this window");
        return;
    }
    let max = days.iter().map(|d| d.total).fold(0.0_f64, f64::max);
    for d in days {
        let bar = if max > 0.0 {
            "#".repeat(((d.total / max) * 30.0).round() as usize)
        } else {
            String::new()
        };
        println!("  {:<12} {:>12.2}  {bar}", d.sales_date, d.total);
    }
}

pub fn print_target(progress: &TargetProgress) {
    let pct = if progress.target_amount > 0.0 {
        progress.total_sales / progress.target_amount * 100.0
    } else {
        0.0
    };
    println!("  Sales:   {:.2}", progress.total_sales);
    println!("  Target:  {:.2}", progress.target_amount);
    println!("  Reached: {pct:.1}%");
}

pub fn print_tasks(tasks: &[Task]) {
    if tasks.is_empty() {
        println!("No tasks");
        return;
    }

    println!("{} task{}:\n", tasks.len(), plural(tasks.len()));
    println!(
        "  {:<6} {:<36} {:<12} {:<12} {:<12}",
        "ID", "TITLE", "STATUS", "LABEL", "DUE"
    );
    println!("  {}", "-".repeat(82));
    for t in tasks {
        println!(
            "  {:<6} {:<36} {:<12} {:<12} {:<12}",
            t.id,
            truncate(&t.title, 34),
            truncate(&t.status, 12),
            truncate(t.label.as_deref().unwrap_or(""), 12),
            t.due_date.as_deref().unwrap_or("-"),
        );
    }
}

pub fn print_task_detail(t: &Task) {
    println!("Task {}: {}", t.id, t.title);
    println!("  Status:  {}", t.status);
    println!("  Owner:   {} (branch {})", t.owner, t.branch_id);
    if let Some(ref label) = t.label {
        println!("  Label:   {label}");
    }
    if let Some(ref start) = t.start_date {
        println!("  Start:   {start}");
    }
    if let Some(ref due) = t.due_date {
        println!("  Due:     {due}");
    }
    println!("  Created: {}", t.created_at);
    if !t.description.is_empty() {
        println!("\n{}", t.description);
    }
}

pub fn print_branches(branches: &[Branch]) {
    for b in branches {
        println!("  {:<6} {}", b.branch_id, b.branch_name);
    }
}

pub fn print_transfers(transfers: &[Transfer]) {
    if transfers.is_empty() {
        println!("No transfers");
        return;
    }
    println!(
        "  {:<6} {:<12} {:>6} {:<16} {:<16} {:<10} {:<12}",
        "ID", "ITEM", "QTY", "FROM", "TO", "STATUS", "CREATED"
    );
    println!("  {}", "-".repeat(84));
    for t in transfers {
        println!(
            "  {:<6} {:<12} {:>6} {:<16} {:<16} {:<10} {:<12}",
            t.id,
            truncate(&t.item_code, 12),
            t.quantity,
            truncate(&t.from_location, 16),
            truncate(&t.to_location, 16),
            truncate(&t.status, 10),
            t.creation_date,
        );
    }
}

pub fn print_events(events: &[Event]) {
    if events.is_empty() {
        println!("No events");
        return;
    }
    for e in events {
        let end = e.ends_at.as_deref().map(|end| format!(" - {end}")).unwrap_or_default();
        println!("  [{}] {}{}  {}", e.id, e.starts_at, end, truncate(&e.title, 50));
    }
}

pub fn print_posts(posts: &[Post]) {
    if posts.is_empty() {
        println!("No posts");
        return;
    }
    for p in posts {
        println!("[{}] {} on {}  ({} like{})", p.id, p.username, p.date, p.likes, plural(p.likes as usize));
        println!("  {}", truncate(&p.text, 76));
        if let Some(ref image) = p.image {
            println!("  image: {image}");
        }
    }
}

pub fn print_stories(stories: &[Story]) {
    if stories.is_empty() {
        println!("No active stories");
        return;
    }
    for s in stories {
        println!("  [{}] {}  {}", s.id, s.created_at, truncate(&s.image, 60));
    }
}

pub fn print_invoices(invoices: &[Invoice]) {
    if invoices.is_empty() {
        println!("No invoices");
        return;
    }
    println!(
        "  {:<28} {:<14} {:<12} {:>12} {:<14}",
        "CLIENT", "INVOICE", "DATE", "AMOUNT", "CATEGORY"
    );
    println!("  {}", "-".repeat(84));
    for i in invoices {
        println!(
            "  {:<28} {:<14} {:<12} {:>12.2} {:<14}",
            truncate(&i.client_name, 28),
            truncate(&i.invoice_number, 14),
            i.date.get(..10).unwrap_or(&i.date),
            i.amount,
            truncate(&i.category, 14),
        );
    }
}

pub fn print_users(users: &[User]) {
    for u in users {
        println!("  {:<6} {:<20} {:<32} {}", u.id, truncate(&u.branch, 20), u.email, u.role);
    }
}

/// Print a built condition and its bound parameters.
pub fn print_condition(cond: &ConditionResult) {
    println!("WHERE {}", cond.predicate);
    for (i, p) in cond.params.iter().enumerate() {
        println!("  ?{} = {p}", i + 1);
    }
}

pub fn print_stats(stats: &DbStats) {
    println!("Database Statistics\n");
    for t in &stats.tables {
        println!("  {:<18} {}", t.table, t.rows);
    }
    println!("\n  Size: {}", format_bytes(stats.db_size_bytes));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_respects_width() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a longer title here", 10), "a longe...");
    }

    #[test]
    fn bytes_are_humanized() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2048), "2.0 KB");
        assert_eq!(format_bytes(5 * 1_048_576), "5.0 MB");
    }
}
