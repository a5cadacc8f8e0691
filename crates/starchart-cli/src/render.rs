//! Plain-text rendering of backend payloads.

use starchart_core::models::{
    ArticleRecord, AstrologyReportRecord, ReportSection, ZodiacInterpretationRecord,
    ZodiacReportRecord,
};
use starchart_core::utils::{format_optional, format_timestamp, truncate_string};
use starchart_core::Identity;

/// Width of article teasers in list views
const TEASER_LENGTH: usize = 80;

pub fn print_identity(identity: &Identity) {
    println!("{} <{}> (id {})", identity.name, identity.email, identity.id);
}

pub fn print_astrology_report(report: &AstrologyReportRecord) {
    let payload = &report.payload;
    println!(
        "{} report for {} - {}",
        capitalize(&report.report_type),
        payload.sign,
        format_timestamp(&report.generated_at)
    );
    println!("  Sun:    {}", payload.sun);
    println!("  Moon:   {}", payload.moon);
    println!("  Rising: {}", payload.rising);
    print_sections(&payload.sections);
}

pub fn print_zodiac_report(report: &ZodiacReportRecord) {
    let payload = &report.payload;
    println!(
        "{} {} year {} - {}",
        payload.element,
        payload.zodiac,
        report.year,
        format_timestamp(&report.generated_at)
    );
    println!("  {}", payload.summary);
    print_sections(&payload.sections);
}

pub fn print_astrology_history(reports: &[AstrologyReportRecord]) {
    if reports.is_empty() {
        println!("No astrology reports yet. Run `starchart report astrology --new`.");
        return;
    }
    for report in reports {
        println!(
            "#{:<5} {:<8} {:<12} {}",
            report.id,
            report.report_type,
            report.payload.sign,
            format_timestamp(&report.generated_at)
        );
    }
}

pub fn print_zodiac_history(reports: &[ZodiacReportRecord]) {
    if reports.is_empty() {
        println!("No zodiac reports yet. Run `starchart report zodiac --new`.");
        return;
    }
    for report in reports {
        println!(
            "#{:<5} {} {:<8} {}",
            report.id,
            report.year,
            report.payload.zodiac,
            format_timestamp(&report.generated_at)
        );
    }
}

fn print_sections(sections: &[ReportSection]) {
    for section in sections {
        println!();
        match section.icon.as_deref() {
            Some(icon) => println!("[{}] {}", icon, section.title),
            None => println!("{}", section.title),
        }
        println!("  {}", section.summary);
        for detail in &section.details {
            println!("  - {}", detail);
        }
    }
}

pub fn print_article_list(articles: &[ArticleRecord]) {
    if articles.is_empty() {
        println!("No articles published.");
        return;
    }
    for article in articles {
        println!("{}  ({})", article.title, article.slug);
        println!(
            "  {} | {}",
            format_timestamp(&article.published_at),
            article.teaser(TEASER_LENGTH)
        );
    }
}

pub fn print_article(article: &ArticleRecord) {
    println!("{}", article.title);
    println!("{}", format_timestamp(&article.published_at));
    if !article.tags.is_empty() {
        println!("Tags: {}", article.tags.join(", "));
    }
    if let Some(ref summary) = article.summary {
        println!();
        println!("{}", summary);
    }
    println!();
    println!("{}", format_optional(&article.content, "(no content)"));
}

pub fn print_interpretation_list(entries: &[ZodiacInterpretationRecord]) {
    for entry in entries {
        println!(
            "{:<12} {:<16} {:<8} {}",
            entry.sign,
            entry.date_range,
            entry.element,
            truncate_string(&entry.summary, TEASER_LENGTH)
        );
    }
}

pub fn print_interpretation(entry: &ZodiacInterpretationRecord) {
    println!("{} - {} ({})", entry.sign, entry.title, entry.date_range);
    println!("{} / {}", entry.element, entry.modality);
    if !entry.keywords.is_empty() {
        println!("Keywords: {}", entry.keywords.join(", "));
    }
    println!();
    println!("{}", entry.summary);
    println!();
    println!("Love:      {}", entry.love);
    println!("Career:    {}", entry.career);
    println!("Wellbeing: {}", entry.wellbeing);
    println!("Ritual:    {}", entry.ritual);
    println!("Mantra:    {}", entry.mantra);
    println!("Lucky color: {}", entry.lucky_color);
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("daily"), "Daily");
        assert_eq!(capitalize(""), "");
        assert_eq!(capitalize("每日"), "每日");
    }
}
