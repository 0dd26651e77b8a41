//! Page content handed to the engine as plain data
//!
//! The engine never authors content; a host can replace every string here
//! (the CLI reads a JSON file with the same shape).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteContent {
    #[serde(default)]
    pub hero: HeroContent,
    #[serde(default)]
    pub about: AboutContent,
    #[serde(default = "default_features")]
    pub features: Vec<FeatureItem>,
}

impl Default for SiteContent {
    fn default() -> Self {
        Self {
            hero: HeroContent::default(),
            about: AboutContent::default(),
            features: default_features(),
        }
    }
}

impl SiteContent {
    /// Every section title in page order, used as anchor targets
    pub fn section_titles(&self) -> Vec<&str> {
        let mut titles = vec![self.hero.title(), self.about.title.as_str()];
        titles.extend(self.features.iter().map(|feature| feature.title.as_str()));
        titles
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeroContent {
    /// Headline lines, each animated in on its own
    pub headline: Vec<String>,
    pub blurb: String,
}

impl HeroContent {
    pub fn title(&self) -> &str {
        self.headline.first().map(String::as_str).unwrap_or_default()
    }
}

impl Default for HeroContent {
    fn default() -> Self {
        Self {
            headline: vec![
                "WELCOME TO THE VAST".to_string(),
                "UNEXPLORED".to_string(),
                "WORLD OF WEB3".to_string(),
            ],
            blurb: "Ferrous bridges blocked economies to the global money pool, turning local \
                    currency into smart investments using AI and DeFi."
                .to_string(),
        }
    }
}

/// The auto-scrolling article
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AboutContent {
    pub title: String,
    pub paragraphs: Vec<String>,
}

impl AboutContent {
    /// Paragraphs with blank entries removed
    pub fn paragraphs(&self) -> impl Iterator<Item = &str> {
        self.paragraphs
            .iter()
            .map(String::as_str)
            .filter(|paragraph| !paragraph.trim().is_empty())
    }
}

impl Default for AboutContent {
    fn default() -> Self {
        Self {
            title: "About Ferrous".to_string(),
            paragraphs: vec![
                "Over 350 million adults in Africa alone remain unbanked, a staggering number \
                 that represents more than just statistics. It reflects real people, real \
                 dreams, and real barriers. And Africa isn't alone. Across many emerging \
                 economies in Latin America, Southeast Asia, and the Middle East, millions \
                 more face the same systemic challenges: limited access to formal banking, \
                 high transaction costs, restrictive international policies, and outdated \
                 financial infrastructures that were never built with them in mind."
                    .to_string(),
                "By leveraging the widespread adoption of mobile money and combining it with \
                 the intelligence of advanced AI, Ferrous breaks through the walls that have \
                 kept billions locked out of meaningful financial growth. The platform enables \
                 users to deposit local currency through familiar mobile channels: no \
                 international cards, no complex KYC, no friction."
                    .to_string(),
                "Once inside, AI does the heavy lifting, guiding users with personalized \
                 investment strategies, managing risk, and handling all the technical \
                 complexity of the global financial system in the background. No need to \
                 understand crypto. No need to study charts. Just access: seamless, \
                 transparent, and designed for inclusion."
                    .to_string(),
                "This is how Ferrous bridges economies once blocked by infrastructure gaps, \
                 high fees, and bureaucracy. It's not just unlocking access to global \
                 investment markets. It's rewriting the rules so that underserved populations \
                 can finally participate, prosper, and preserve their wealth on their own terms."
                    .to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureItem {
    pub title: String,
    pub summary: String,
}

impl FeatureItem {
    fn new(title: &str, summary: &str) -> Self {
        Self {
            title: title.to_string(),
            summary: summary.to_string(),
        }
    }
}

fn default_features() -> Vec<FeatureItem> {
    vec![
        FeatureItem::new(
            "Mobile Money Integration",
            "Ferrous integrates with mobile wallets like M-Pesa, MTN Mobile Money, and bank \
             transfers enabling local deposits with no banking barriers or international card \
             limitations.",
        ),
        FeatureItem::new(
            "AI-Driven Investment Engine",
            "A powerful AI guides users through personalized investment strategies based on \
             their income, goals, and risk tolerance automating decisions previously reserved \
             for expert advisors.",
        ),
        FeatureItem::new(
            "Stablecoin-Powered Asset Access",
            "Ferrous enables seamless deposits via mobile money and local banks, eliminating \
             foreign exchange barriers and making global investment accessible with the \
             currencies people already use and trust.",
        ),
        FeatureItem::new(
            "Zero Jargon User Experience",
            "The platform removes the complexity of Web3: no wallets, no gas fees, no seed \
             phrases. Just tap, invest, and grow. All the tech is abstracted under the hood.",
        ),
    ]
}
