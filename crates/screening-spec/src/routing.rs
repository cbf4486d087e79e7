use std::fmt;

/// Pages of the screening wizard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Page {
    Landing,
    Prelim,
    CaseType,
    Arrest,
    Misdemeanor,
    Felony,
    Results,
}

impl Page {
    pub fn document(&self) -> &'static str {
        match self {
            Page::Landing => "index.html",
            Page::Prelim => "prelim.html",
            Page::CaseType => "case-type.html",
            Page::Arrest => "arrest.html",
            Page::Misdemeanor => "misdo.html",
            Page::Felony => "felony.html",
            Page::Results => "results.html",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Page::Landing => "Expungement Screening",
            Page::Prelim => "Preliminary Questions",
            Page::CaseType => "Case Type",
            Page::Arrest => "Arrest Record",
            Page::Misdemeanor => "Misdemeanor Case",
            Page::Felony => "Felony Case",
            Page::Results => "Results",
        }
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.document())
    }
}

/// Batch name fragments in routing priority order.
const BATCH_ROUTES: [(&str, Page); 5] = [
    ("prelim_questions", Page::Prelim),
    ("case_questions", Page::CaseType),
    ("arrest_questions", Page::Arrest),
    ("misdo_questions", Page::Misdemeanor),
    ("felony_questions", Page::Felony),
];

/// Page that renders a batch loaded from `filenames`; `None` means stay put.
pub fn next_page<S: AsRef<str>>(filenames: &[S]) -> Option<Page> {
    if filenames.is_empty() {
        return None;
    }
    let joined = filenames
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(",");
    BATCH_ROUTES
        .iter()
        .find(|(fragment, _)| joined.contains(fragment))
        .map(|(_, page)| *page)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn misdemeanor_batch_routes_to_misdo_page() {
        assert_eq!(next_page(&["misdo_questions_v2.json"]), Some(Page::Misdemeanor));
        assert_eq!(Page::Misdemeanor.document(), "misdo.html");
    }

    #[test]
    fn unrecognized_or_empty_stays() {
        assert_eq!(next_page(&["exception_questions.json"]), None);
        assert_eq!(next_page::<String>(&[]), None);
    }

    #[test]
    fn priority_follows_batch_order() {
        assert_eq!(
            next_page(&[
                "questions/shared_questions.json",
                "questions/felony_questions.json",
                "questions/case_questions.json",
            ]),
            Some(Page::CaseType)
        );
    }
}
