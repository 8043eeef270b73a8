//! Typed mirrors of the backend resources.
//!
//! Enums serialize to the backend's enum key names (`"EDUCATION"`, `"GBP"`),
//! so an unexpected value fails at decode time instead of leaking into the UI.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Industry an organisation belongs to.
///
/// `All` only exists as a query filter and is never sent to the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Industry {
    All,
    AccountancyBankingFinance,
    #[serde(alias = "BUSINSS_CONSULTING_MANAGEMENT")]
    BusinessConsultingManagement,
    CharityAndVoluntaryWork,
    CreativeArtsAndDesign,
    Education,
    EnergyAndUtilities,
    EngineeringAndManufacturing,
    Hospitality,
    // The backend key carries this spelling
    #[serde(rename = "INFORMATION_TECHONOLOGY", alias = "INFORMATION_TECHNOLOGY")]
    InformationTechnology,
    Law,
    LawEnforcementAndSecurity,
    LeisureSportsAndTourism,
    MarketingAdvertisingAndPr,
    MediaAndInternet,
    PropertyAndConstruction,
    PublicServices,
    RecruitmentAndHr,
    Retail,
    Sales,
    ScienceAndPharmaceuticals,
    SocialCare,
    TransportAndLogistics,
}

impl Industry {
    /// Every real industry, in display order (excludes `All`)
    pub const ALL_INDUSTRIES: [Industry; 22] = [
        Industry::AccountancyBankingFinance,
        Industry::BusinessConsultingManagement,
        Industry::CharityAndVoluntaryWork,
        Industry::CreativeArtsAndDesign,
        Industry::Education,
        Industry::EnergyAndUtilities,
        Industry::EngineeringAndManufacturing,
        Industry::Hospitality,
        Industry::InformationTechnology,
        Industry::Law,
        Industry::LawEnforcementAndSecurity,
        Industry::LeisureSportsAndTourism,
        Industry::MarketingAdvertisingAndPr,
        Industry::MediaAndInternet,
        Industry::PropertyAndConstruction,
        Industry::PublicServices,
        Industry::RecruitmentAndHr,
        Industry::Retail,
        Industry::Sales,
        Industry::ScienceAndPharmaceuticals,
        Industry::SocialCare,
        Industry::TransportAndLogistics,
    ];

    /// The key the backend uses for this industry
    pub fn key(&self) -> &'static str {
        match self {
            Self::All => "ALL",
            Self::AccountancyBankingFinance => "ACCOUNTANCY_BANKING_FINANCE",
            Self::BusinessConsultingManagement => "BUSINESS_CONSULTING_MANAGEMENT",
            Self::CharityAndVoluntaryWork => "CHARITY_AND_VOLUNTARY_WORK",
            Self::CreativeArtsAndDesign => "CREATIVE_ARTS_AND_DESIGN",
            Self::Education => "EDUCATION",
            Self::EnergyAndUtilities => "ENERGY_AND_UTILITIES",
            Self::EngineeringAndManufacturing => "ENGINEERING_AND_MANUFACTURING",
            Self::Hospitality => "HOSPITALITY",
            Self::InformationTechnology => "INFORMATION_TECHONOLOGY",
            Self::Law => "LAW",
            Self::LawEnforcementAndSecurity => "LAW_ENFORCEMENT_AND_SECURITY",
            Self::LeisureSportsAndTourism => "LEISURE_SPORTS_AND_TOURISM",
            Self::MarketingAdvertisingAndPr => "MARKETING_ADVERTISING_AND_PR",
            Self::MediaAndInternet => "MEDIA_AND_INTERNET",
            Self::PropertyAndConstruction => "PROPERTY_AND_CONSTRUCTION",
            Self::PublicServices => "PUBLIC_SERVICES",
            Self::RecruitmentAndHr => "RECRUITMENT_AND_HR",
            Self::Retail => "RETAIL",
            Self::Sales => "SALES",
            Self::ScienceAndPharmaceuticals => "SCIENCE_AND_PHARMACEUTICALS",
            Self::SocialCare => "SOCIAL_CARE",
            Self::TransportAndLogistics => "TRANSPORT_AND_LOGISTICS",
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            Self::All => "All",
            Self::AccountancyBankingFinance => "Accountancy, Banking and Finance",
            Self::BusinessConsultingManagement => "Business, Consulting and Management",
            Self::CharityAndVoluntaryWork => "Charity and Voluntary Work",
            Self::CreativeArtsAndDesign => "Creative Arts and Design",
            Self::Education => "Education",
            Self::EnergyAndUtilities => "Energy and Utilities",
            Self::EngineeringAndManufacturing => "Engineering and Manufacturing",
            Self::Hospitality => "Hospitality",
            Self::InformationTechnology => "I.T",
            Self::Law => "Law",
            Self::LawEnforcementAndSecurity => "Law Enforcement and Security",
            Self::LeisureSportsAndTourism => "Leisure, Sports and Tourism",
            Self::MarketingAdvertisingAndPr => "Marketing, Advertising and PR",
            Self::MediaAndInternet => "Media and Internet",
            Self::PropertyAndConstruction => "Property and Construction",
            Self::PublicServices => "Public services",
            Self::RecruitmentAndHr => "Recruitment and HR",
            Self::Retail => "Retail",
            Self::Sales => "Sales",
            Self::ScienceAndPharmaceuticals => "Science and Pharmaceuticals",
            Self::SocialCare => "Social care",
            Self::TransportAndLogistics => "Transport and Logistics",
        }
    }

    /// Parse a backend key, case-insensitively
    pub fn from_key(s: &str) -> Option<Self> {
        let upper = s.trim().to_uppercase().replace(['-', ' '], "_");
        match upper.as_str() {
            "ALL" => Some(Self::All),
            "INFORMATION_TECHNOLOGY" | "IT" => Some(Self::InformationTechnology),
            "BUSINSS_CONSULTING_MANAGEMENT" => Some(Self::BusinessConsultingManagement),
            key => Self::ALL_INDUSTRIES
                .iter()
                .copied()
                .find(|industry| industry.key() == key),
        }
    }

    /// The value to send as a query filter; `All` means no filter
    pub fn as_filter(&self) -> Option<&'static str> {
        match self {
            Self::All => None,
            other => Some(other.key()),
        }
    }
}

impl fmt::Display for Industry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Currency {
    Gbp,
    Usd,
    Eur,
    Jpy,
    Cny,
}

impl Currency {
    pub fn key(&self) -> &'static str {
        match self {
            Self::Gbp => "GBP",
            Self::Usd => "USD",
            Self::Eur => "EUR",
            Self::Jpy => "JPY",
            Self::Cny => "CNY",
        }
    }

    pub fn from_key(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "GBP" => Some(Self::Gbp),
            "USD" => Some(Self::Usd),
            "EUR" => Some(Self::Eur),
            "JPY" => Some(Self::Jpy),
            "CNY" => Some(Self::Cny),
            _ => None,
        }
    }
}

/// Overall tag a reviewer gives their employer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Rating {
    Good,
    Average,
    Bad,
}

impl Rating {
    pub fn key(&self) -> &'static str {
        match self {
            Self::Good => "GOOD",
            Self::Average => "AVERAGE",
            Self::Bad => "BAD",
        }
    }

    pub fn from_key(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "GOOD" => Some(Self::Good),
            "AVERAGE" => Some(Self::Average),
            "BAD" => Some(Self::Bad),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Vote {
    Upvote,
    Downvote,
}

impl Vote {
    /// +1 for an upvote, -1 for a downvote
    pub fn weight(&self) -> i64 {
        match self {
            Self::Upvote => 1,
            Self::Downvote => -1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountStatus {
    #[default]
    Active,
    Suspended,
    Inactive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountType {
    #[default]
    User,
    Admin,
}

/// A review an account wrote about a position at an organisation
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Review {
    pub id: i64,
    #[serde(default)]
    pub position: String,
    #[serde(default)]
    pub salary: i64,
    pub currency: Currency,
    pub location: String,
    #[serde(default = "default_duration_years")]
    pub duration_years: f64,
    pub review: String,
    pub account_id: i64,
    pub org_id: i64,
    pub created_at: i64,
    #[serde(default)]
    pub tag: Option<Rating>,
    #[serde(default)]
    pub upvotes: Vec<i64>,
    #[serde(default)]
    pub downvotes: Vec<i64>,
}

fn default_duration_years() -> f64 {
    1.0
}

/// An interview report
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Interview {
    pub id: i64,
    #[serde(default)]
    pub position: String,
    pub location: String,
    pub interview: String,
    #[serde(default)]
    pub offer: Option<i64>,
    #[serde(default)]
    pub currency: Option<Currency>,
    pub account_id: i64,
    pub org_id: i64,
    pub created_at: i64,
    #[serde(default)]
    pub tag: Option<Rating>,
    #[serde(default)]
    pub upvotes: Vec<i64>,
    #[serde(default)]
    pub downvotes: Vec<i64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ReviewVote {
    pub id: i64,
    pub account_id: i64,
    pub review_id: i64,
    pub vote: Vote,
    #[serde(default)]
    pub created_at: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct InterviewVote {
    pub id: i64,
    pub account_id: i64,
    pub interview_id: i64,
    pub vote: Vote,
    #[serde(default)]
    pub created_at: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Organisation {
    pub id: i64,
    pub name: String,
    pub created_at: i64,
    #[serde(default)]
    pub headquarters: String,
    pub industry: Industry,
    #[serde(default = "default_size")]
    pub size: i64,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub reviews: Vec<Review>,
    #[serde(default)]
    pub interviews: Vec<Interview>,
}

fn default_size() -> i64 {
    1
}

impl Organisation {
    /// Reviews and interviews merged, newest first
    pub fn posts(&self) -> Vec<Post> {
        merge_posts(&self.reviews, &self.interviews)
    }
}

/// Entry of the organisation name listing used to feed pickers
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct OrgName {
    pub id: i64,
    #[serde(alias = "name")]
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Account {
    pub id: i64,
    pub username: String,
    pub created_at: i64,
    #[serde(default)]
    pub status: Option<AccountStatus>,
    #[serde(default, rename = "type")]
    pub account_type: Option<AccountType>,
    #[serde(default)]
    pub anonymous: bool,
    #[serde(default)]
    pub dark_mode: bool,
    #[serde(default)]
    pub reviews: Vec<Review>,
    #[serde(default)]
    pub interviews: Vec<Interview>,
}

impl Account {
    pub fn is_active(&self) -> bool {
        self.status.unwrap_or_default() == AccountStatus::Active
    }

    pub fn is_admin(&self) -> bool {
        self.account_type.unwrap_or_default() == AccountType::Admin
    }

    /// Reviews and interviews merged, newest first
    pub fn posts(&self) -> Vec<Post> {
        merge_posts(&self.reviews, &self.interviews)
    }
}

/// A review or interview record authored by an account
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Post {
    Review(Review),
    Interview(Interview),
}

impl Post {
    pub fn id(&self) -> i64 {
        match self {
            Self::Review(r) => r.id,
            Self::Interview(i) => i.id,
        }
    }

    pub fn created_at(&self) -> i64 {
        match self {
            Self::Review(r) => r.created_at,
            Self::Interview(i) => i.created_at,
        }
    }

    pub fn position(&self) -> &str {
        match self {
            Self::Review(r) => &r.position,
            Self::Interview(i) => &i.position,
        }
    }

    pub fn org_id(&self) -> i64 {
        match self {
            Self::Review(r) => r.org_id,
            Self::Interview(i) => i.org_id,
        }
    }

    pub fn account_id(&self) -> i64 {
        match self {
            Self::Review(r) => r.account_id,
            Self::Interview(i) => i.account_id,
        }
    }

    /// Upvotes minus downvotes
    pub fn score(&self) -> i64 {
        let (up, down) = match self {
            Self::Review(r) => (r.upvotes.len(), r.downvotes.len()),
            Self::Interview(i) => (i.upvotes.len(), i.downvotes.len()),
        };
        up as i64 - down as i64
    }
}

fn merge_posts(reviews: &[Review], interviews: &[Interview]) -> Vec<Post> {
    let mut posts: Vec<Post> = reviews
        .iter()
        .cloned()
        .map(Post::Review)
        .chain(interviews.iter().cloned().map(Post::Interview))
        .collect();
    // Stable sort keeps reviews ahead of interviews on equal timestamps
    posts.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
    posts
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn review(id: i64, created_at: i64) -> Review {
        Review {
            id,
            position: "engineer".to_string(),
            salary: 50_000,
            currency: Currency::Gbp,
            location: "London".to_string(),
            duration_years: 2.0,
            review: "fine".to_string(),
            account_id: 1,
            org_id: 7,
            created_at,
            tag: Some(Rating::Good),
            upvotes: vec![2, 3],
            downvotes: vec![4],
        }
    }

    fn interview(id: i64, created_at: i64) -> Interview {
        Interview {
            id,
            position: "analyst".to_string(),
            location: "Leeds".to_string(),
            interview: "two rounds".to_string(),
            offer: None,
            currency: None,
            account_id: 1,
            org_id: 7,
            created_at,
            tag: None,
            upvotes: vec![],
            downvotes: vec![],
        }
    }

    #[test]
    fn test_industry_keys_roundtrip_through_serde() {
        for industry in Industry::ALL_INDUSTRIES {
            let encoded = serde_json::to_value(industry).unwrap();
            assert_eq!(encoded, json!(industry.key()));
            assert_eq!(Industry::from_key(industry.key()), Some(industry));
        }
    }

    #[test]
    fn test_industry_it_spelling() {
        let decoded: Industry = serde_json::from_value(json!("INFORMATION_TECHONOLOGY")).unwrap();
        assert_eq!(decoded, Industry::InformationTechnology);
        let decoded: Industry = serde_json::from_value(json!("INFORMATION_TECHNOLOGY")).unwrap();
        assert_eq!(decoded, Industry::InformationTechnology);
        assert_eq!(decoded.label(), "I.T");
    }

    #[test]
    fn test_industry_from_key_is_lenient() {
        assert_eq!(Industry::from_key("education"), Some(Industry::Education));
        assert_eq!(
            Industry::from_key("social-care"),
            Some(Industry::SocialCare)
        );
        assert_eq!(Industry::from_key("all"), Some(Industry::All));
        assert!(Industry::from_key("farming").is_none());
    }

    #[test]
    fn test_industry_all_is_not_a_filter() {
        assert_eq!(Industry::All.as_filter(), None);
        assert_eq!(Industry::Retail.as_filter(), Some("RETAIL"));
    }

    #[test]
    fn test_unknown_enum_value_fails_decode() {
        let result: Result<Currency, _> = serde_json::from_value(json!("BTC"));
        assert!(result.is_err());
    }

    #[test]
    fn test_decode_organisation_with_defaults() {
        let org: Organisation = serde_json::from_value(json!({
            "id": 3,
            "name": "Acme Corp",
            "created_at": 1_600_000_000,
            "industry": "RETAIL"
        }))
        .unwrap();
        assert_eq!(org.size, 1);
        assert!(org.url.is_none());
        assert!(org.reviews.is_empty());
    }

    #[test]
    fn test_org_name_accepts_name_alias() {
        let entry: OrgName = serde_json::from_value(json!({"id": 1, "name": "Globex"})).unwrap();
        assert_eq!(entry.label, "Globex");
    }

    #[test]
    fn test_account_type_field_rename() {
        let account: Account = serde_json::from_value(json!({
            "id": 1,
            "username": "kim",
            "created_at": 10,
            "type": "ADMIN",
            "status": "SUSPENDED"
        }))
        .unwrap();
        assert!(account.is_admin());
        assert!(!account.is_active());
    }

    #[test]
    fn test_posts_merge_newest_first() {
        let org = Organisation {
            id: 7,
            name: "Acme".to_string(),
            created_at: 0,
            headquarters: "London".to_string(),
            industry: Industry::Retail,
            size: 10,
            url: None,
            reviews: vec![review(1, 100), review(2, 300)],
            interviews: vec![interview(3, 200)],
        };
        let ids: Vec<i64> = org.posts().iter().map(|p| p.id()).collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }

    #[test]
    fn test_post_score() {
        assert_eq!(Post::Review(review(1, 0)).score(), 1);
        assert_eq!(Post::Interview(interview(1, 0)).score(), 0);
    }

    #[test]
    fn test_vote_weight() {
        let vote: ReviewVote = serde_json::from_value(json!({
            "id": 1, "account_id": 2, "review_id": 3, "vote": "DOWNVOTE"
        }))
        .unwrap();
        assert_eq!(vote.vote.weight(), -1);
    }
}
