//! Vote-field initialization for votable documents.

use mongodb::bson::Document;

/// Attach the vote bookkeeping fields to a freshly built document.
///
/// Every votable record (problems, solutions, comments) carries a `voting`
/// tally and a `votes` array; both start empty. Existing fields with these
/// names are overwritten, so this must run before any vote is recorded.
pub fn attach_vote_fields(mut document: Document) -> Document {
    document.insert("voting", 0i32);
    document.insert("votes", Vec::<mongodb::bson::Bson>::new());
    document
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::doc;

    #[test]
    fn test_attach_vote_fields() {
        let document = attach_vote_fields(doc! { "title": "Two Sum" });
        assert_eq!(document.get_str("title").unwrap(), "Two Sum");
        assert_eq!(document.get_i32("voting").unwrap(), 0);
        assert!(document.get_array("votes").unwrap().is_empty());
    }

    #[test]
    fn test_attach_vote_fields_resets_existing() {
        let document = attach_vote_fields(doc! { "voting": 7, "votes": [1, 2] });
        assert_eq!(document.get_i32("voting").unwrap(), 0);
        assert!(document.get_array("votes").unwrap().is_empty());
    }
}
