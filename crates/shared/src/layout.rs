//! Static slide plan for the weekly report.
//!
//! Slides 1-2 are the fixed cover and table of contents, followed by six
//! slides per category and four insight/outlook slides. Numbers are
//! configuration, never derived from the data.

use chrono::NaiveDate;

use crate::config::DateWindow;
use crate::models::{Category, ReportSlide};

pub const REPORT_TITLE: &str = "Space Business Weekly Report";
pub const TOTAL_SLIDES: u32 = 30;

/// A report section occupying a contiguous run of slide numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Category(Category),
    Insight,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionPlan {
    pub section: Section,
    pub label: &'static str,
    pub start: u32,
    pub count: u32,
    /// One design directive per planned slide.
    pub directives: &'static [&'static str],
}

impl SectionPlan {
    pub fn end(&self) -> u32 {
        self.start + self.count - 1
    }

    pub fn numbers(&self) -> impl Iterator<Item = u32> {
        self.start..self.start + self.count
    }

    pub fn contains(&self, slide_number: u32) -> bool {
        (self.start..=self.end()).contains(&slide_number)
    }
}

const POLICY_DIRECTIVES: &[&str] = &[
    "Week at a glance: the most consequential policy moves, shown as a table of country, agency and action.",
    "United States: NASA, FAA, FCC and Space Force decisions and what they change for operators.",
    "Europe: ESA, EU Space Act and national agency developments.",
    "China: state programme milestones and the commercial sector's regulatory climate.",
    "Japan: JAXA, cabinet office and legislative changes, with domestic industry impact.",
    "Cross-region comparison: a bar chart counting policy actions per region, with the main divergence called out.",
];

const RESEARCH_DIRECTIVES: &[&str] = &[
    "Research overview: themes of this week's papers as a pie chart of topic shares.",
    "Instrumentation and methods: the most notable new technique and its readiness level.",
    "Earth and planetary science: results with commercial or mission-planning relevance.",
    "Commercial space research: papers analysing markets, operations or economics.",
    "From lab to market: which results could reach products within five years, as a table.",
    "Research watchlist: papers and groups to follow next week.",
];

const BUSINESS_DIRECTIVES: &[&str] = &[
    "Business headlines: the week's top deals, launches and contracts as a table.",
    "Launch services: cadence, pricing and provider competition.",
    "Satellite communications and Earth observation: service and customer news.",
    "In-space economy: stations, servicing, manufacturing and logistics.",
    "Japanese space business: notable companies and partnerships.",
    "Market structure: a bar chart of deal activity by segment, with the leading segment explained.",
];

const FUNDING_DIRECTIVES: &[&str] = &[
    "Funding at a glance: rounds announced this week as a table of company, stage and amount.",
    "Largest rounds: who raised, who invested and why it matters.",
    "Government and institutional funding: grants, contracts and public programmes.",
    "Investor activity: the most active investors and their thesis.",
    "Regional split: a pie chart of disclosed funding by region.",
    "Funding outlook: signals for the coming quarter.",
];

const INSIGHT_DIRECTIVES: &[&str] = &[
    "Key takeaway of the week for executives, one decisive message with supporting evidence.",
    "Cross-category trends linking policy, research, business and funding.",
    "Risks and opportunities: a table of the top items with likelihood and impact.",
    "Outlook and recommended actions for investors and operators over the next month.",
];

pub static CATEGORY_PLANS: [SectionPlan; 4] = [
    SectionPlan {
        section: Section::Category(Category::Policy),
        label: "Space Policy (US / EU / China / Japan)",
        start: 3,
        count: 6,
        directives: POLICY_DIRECTIVES,
    },
    SectionPlan {
        section: Section::Category(Category::Research),
        label: "Latest Research",
        start: 9,
        count: 6,
        directives: RESEARCH_DIRECTIVES,
    },
    SectionPlan {
        section: Section::Category(Category::Business),
        label: "Space Business",
        start: 15,
        count: 6,
        directives: BUSINESS_DIRECTIVES,
    },
    SectionPlan {
        section: Section::Category(Category::Funding),
        label: "Funding & Investment",
        start: 21,
        count: 6,
        directives: FUNDING_DIRECTIVES,
    },
];

pub static INSIGHT_PLAN: SectionPlan = SectionPlan {
    section: Section::Insight,
    label: "Insights & Outlook",
    start: 27,
    count: 4,
    directives: INSIGHT_DIRECTIVES,
};

pub fn plan_for(category: Category) -> Option<&'static SectionPlan> {
    CATEGORY_PLANS
        .iter()
        .find(|plan| plan.section == Section::Category(category))
}

/// Slides 1 and 2.
pub fn front_matter(run_date: NaiveDate, window: &DateWindow) -> Vec<ReportSlide> {
    let cover = ReportSlide::new(1, REPORT_TITLE, format!("Week ending {}", run_date.format("%Y-%m-%d")))
        .with_insights(vec![
            format!("Generated: {}", run_date.format("%Y-%m-%d")),
            format!("Coverage: {}", window.describe()),
            "Sources: SpaceNews / Google News / arXiv".to_string(),
            "Regions: Japan, United States, Europe, China".to_string(),
        ]);

    let contents: Vec<String> = CATEGORY_PLANS
        .iter()
        .chain(std::iter::once(&INSIGHT_PLAN))
        .enumerate()
        .map(|(i, plan)| {
            format!(
                "{}. {} (slides {}-{})",
                i + 1,
                plan.label,
                plan.start,
                plan.end()
            )
        })
        .collect();

    let toc = ReportSlide::new(2, "Contents", "What this week's report covers").with_insights(contents);

    vec![cover, toc]
}
