use cryolabel::paginate::expand;
use cryolabel::*;
use proptest::prelude::*;

fn pages_of(records: usize, first: usize, per_page: usize, copies: usize) -> Pagination<usize> {
    let records: Vec<usize> = (0..records).collect();
    paginate(first, per_page, &records, copies).unwrap()
}

#[test]
fn test_everything_fits_on_first_page() {
    let pagination = pages_of(5, 10, 10, 1);
    assert_eq!(pagination.first_page.len(), 5);
    assert!(pagination.other_pages.is_empty());
}

#[test]
fn test_overflow_onto_second_page() {
    let pagination = pages_of(10, 12, 12, 2);
    assert_eq!(pagination.first_page, vec![0, 0, 1, 1, 2, 2, 3, 3, 4, 4, 5, 5]);
    assert_eq!(pagination.other_pages, vec![vec![6, 6, 7, 7, 8, 8, 9, 9]]);
}

#[test]
fn test_copy_group_straddles_page_boundary() {
    // 3 copies into a 4-cell first page: record 1 splits 1 + 2
    let pagination = pages_of(3, 4, 6, 3);
    assert_eq!(pagination.first_page, vec![0, 0, 0, 1]);
    assert_eq!(pagination.other_pages, vec![vec![1, 1, 2, 2, 2]]);
}

#[test]
fn test_hangover_carries_across_several_pages() {
    let pagination = pages_of(7, 5, 5, 3);
    let pages = pagination.into_pages();
    assert_eq!(
        pages,
        vec![
            vec![0, 0, 0, 1, 1],
            vec![1, 2, 2, 2, 3],
            vec![3, 3, 4, 4, 4],
            vec![5, 5, 5, 6, 6],
            vec![6],
        ]
    );
}

#[test]
fn test_group_larger_than_page_is_rejected() {
    let records: Vec<usize> = (0..3).collect();
    let result = paginate(4, 4, &records, 5);
    assert!(matches!(
        result,
        Err(LabelError::Capacity {
            copies: 5,
            capacity: 4
        })
    ));
}

#[test]
fn test_zero_copies_is_rejected() {
    let records = vec!["a"];
    assert!(matches!(
        paginate(4, 4, &records, 0),
        Err(LabelError::InvalidCopies(_))
    ));
}

proptest! {
    #[test]
    fn prop_conserves_and_orders_labels(
        n in 0usize..120,
        first in 0usize..40,
        per_page in 1usize..40,
        copies_seed in 0usize..40,
    ) {
        let copies = copies_seed % per_page + 1;
        let records: Vec<usize> = (0..n).collect();
        let pagination = paginate(first, per_page, &records, copies).unwrap();

        prop_assert_eq!(pagination.total_items(), n * copies);

        let flat: Vec<usize> = pagination.clone().into_pages().concat();
        prop_assert_eq!(flat, expand(&records, copies));
    }

    #[test]
    fn prop_pages_respect_capacity(
        n in 0usize..120,
        first in 0usize..40,
        per_page in 1usize..40,
        copies_seed in 0usize..40,
    ) {
        let copies = copies_seed % per_page + 1;
        let records: Vec<usize> = (0..n).collect();
        let pagination = paginate(first, per_page, &records, copies).unwrap();

        if pagination.other_pages.is_empty() {
            prop_assert!(pagination.first_page.len() <= first);
        } else {
            prop_assert_eq!(pagination.first_page.len(), first);
            let last = pagination.other_pages.len() - 1;
            for (i, page) in pagination.other_pages.iter().enumerate() {
                prop_assert!(page.len() <= per_page);
                prop_assert!(!page.is_empty());
                if i < last {
                    prop_assert_eq!(page.len(), per_page);
                }
            }
            let expected_pages = 1 + (n * copies - first).div_ceil(per_page);
            prop_assert_eq!(pagination.page_count(), expected_pages);
        }
    }

    #[test]
    fn prop_oversized_groups_are_rejected(
        n in 1usize..20,
        per_page in 1usize..10,
        extra in 1usize..5,
    ) {
        let copies = per_page + extra;
        let records: Vec<usize> = (0..n).collect();
        let result = paginate(per_page, per_page, &records, copies);
        prop_assert!(result.is_err());
    }
}
