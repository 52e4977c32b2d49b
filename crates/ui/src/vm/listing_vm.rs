use services::TestListing;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TestCardVm {
    pub id: String,
    pub title: String,
    pub code: Option<String>,
    pub count_label: String,
}

impl From<&TestListing> for TestCardVm {
    fn from(listing: &TestListing) -> Self {
        let count_label = match listing.question_count {
            1 => "1 question".to_string(),
            n => format!("{n} questions"),
        };
        Self {
            id: listing.id.as_str().to_owned(),
            title: listing.title.clone(),
            code: (!listing.code.is_empty()).then(|| listing.code.clone()),
            count_label,
        }
    }
}

#[must_use]
pub fn map_test_cards(listings: &[TestListing]) -> Vec<TestCardVm> {
    listings.iter().map(TestCardVm::from).collect()
}
