use super::domain::{MatchError, Officer, Post};
use std::collections::HashSet;

/// Rejects tables whose duplicates would make tie-breaks ambiguous.
pub fn validate_tables(officers: &[Officer], posts: &[Post]) -> Result<(), MatchError> {
    let mut officer_ids = HashSet::with_capacity(officers.len());
    for officer in officers {
        if !officer_ids.insert(&officer.id) {
            return Err(MatchError::DuplicateOfficer(officer.id.clone()));
        }

        let mut seen = HashSet::with_capacity(officer.choices.len());
        for choice in &officer.choices {
            if !seen.insert(&choice.post) {
                return Err(MatchError::DuplicateChoice {
                    officer: officer.id.clone(),
                    post: choice.post.clone(),
                });
            }
        }
    }

    let mut post_codes = HashSet::with_capacity(posts.len());
    for post in posts {
        if !post_codes.insert(&post.code) {
            return Err(MatchError::DuplicatePost(post.code.clone()));
        }

        let mut seen = HashSet::with_capacity(post.ranking.len());
        for officer in &post.ranking {
            if !seen.insert(officer) {
                return Err(MatchError::DuplicateRanking {
                    post: post.code.clone(),
                    officer: officer.clone(),
                });
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::domain::{OfficerId, PostCode};

    #[test]
    fn accepts_well_formed_tables() {
        let officers = vec![
            Officer::new("M1", "Ang").with_choices(["P1", "P2"]),
            Officer::new("M2", "Lim").with_choices(["P2"]),
        ];
        let posts = vec![
            Post::new("P1", "Medicine", 1).with_ranking(["M1", "M2"]),
            Post::new("P2", "Surgery", 1),
        ];
        assert_eq!(validate_tables(&officers, &posts), Ok(()));
    }

    #[test]
    fn rejects_repeated_choice() {
        let officers = vec![Officer::new("M1", "Ang").with_choices(["P1", "P2", "P1"])];
        assert_eq!(
            validate_tables(&officers, &[]),
            Err(MatchError::DuplicateChoice {
                officer: OfficerId::new("M1"),
                post: PostCode::new("P1"),
            })
        );
    }

    #[test]
    fn rejects_repeated_ranking_entry() {
        let posts = vec![Post::new("P1", "Medicine", 2).with_ranking(["M1", "M2", "M1"])];
        assert_eq!(
            validate_tables(&[], &posts),
            Err(MatchError::DuplicateRanking {
                post: PostCode::new("P1"),
                officer: OfficerId::new("M1"),
            })
        );
    }

    #[test]
    fn rejects_repeated_table_keys() {
        let officers = vec![Officer::new("M1", "Ang"), Officer::new("M1", "Ang")];
        assert!(matches!(
            validate_tables(&officers, &[]),
            Err(MatchError::DuplicateOfficer(_))
        ));

        let posts = vec![Post::new("P1", "A", 1), Post::new("P1", "B", 2)];
        assert!(matches!(
            validate_tables(&[], &posts),
            Err(MatchError::DuplicatePost(_))
        ));
    }
}
