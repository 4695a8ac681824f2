//! Paging metadata tests

use core_kernel::PageResult;
use proptest::prelude::*;

#[test]
fn test_middle_page() {
    let page = PageResult::new(vec![1, 2], 1, 2, 5);

    assert_eq!(page.total_pages(), 3);
    assert!(!page.is_first());
    assert!(!page.is_last());
}

proptest! {
    #[test]
    fn total_pages_is_ceiling(total in 0u64..100_000u64, size in 1u32..=100u32) {
        let page: PageResult<u8> = PageResult::new(vec![], 0, size, total);
        let pages = page.total_pages();

        prop_assert!(pages * u64::from(size) >= total);
        prop_assert!(pages == 0 || (pages - 1) * u64::from(size) < total);
    }

    #[test]
    fn exactly_one_last_page(total in 1u64..10_000u64, size in 1u32..=100u32) {
        let first: PageResult<u8> = PageResult::new(vec![], 0, size, total);
        let pages = first.total_pages();

        let last_pages = (0..pages)
            .filter(|p| PageResult::<u8>::new(vec![], *p as u32, size, total).is_last())
            .count();
        prop_assert_eq!(last_pages, 1);
    }
}
