use serde::{Deserialize, Serialize};

/// One page of a filtered listing; `total` counts every match before
/// pagination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub page: usize,
    pub page_size: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemsResponse<T> {
    pub items: Vec<T>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OkResponse {
    pub ok: bool,
}

/// Slices `items` to the 1-based `page`. Page and page size below 1 are
/// treated as 1.
pub fn paginate<T>(items: Vec<T>, page: usize, page_size: usize) -> Page<T> {
    let page = page.max(1);
    let page_size = page_size.max(1);
    let total = items.len();
    let start = (page - 1).saturating_mul(page_size);
    let items = items.into_iter().skip(start).take(page_size).collect();
    Page {
        items,
        total,
        page,
        page_size,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_length_matches_remaining_items() {
        for total in [0usize, 1, 9, 10, 11, 25] {
            for page_size in [1usize, 3, 10] {
                for page in 1..=5usize {
                    let result = paginate((0..total).collect(), page, page_size);
                    let expected =
                        page_size.min(total.saturating_sub((page - 1) * page_size));
                    assert_eq!(result.items.len(), expected);
                    assert_eq!(result.total, total);
                }
            }
        }
    }

    #[test]
    fn out_of_range_inputs_are_normalized() {
        let result = paginate(vec![1, 2, 3], 0, 0);
        assert_eq!(result.page, 1);
        assert_eq!(result.page_size, 1);
        assert_eq!(result.items, vec![1]);
    }

    #[test]
    fn page_serializes_page_size_in_camel_case() {
        let json = serde_json::to_value(paginate(vec!["a"], 1, 10)).unwrap();
        assert_eq!(json["pageSize"], 10);
        assert_eq!(json["total"], 1);
    }
}
