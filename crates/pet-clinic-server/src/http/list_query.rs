//! Query-string parsing for `GET /clients`.

use pet_clinic_core::models::{ClientFilters, ClientOrder, ClientSortBy, PetType, SortDirection};
use pet_clinic_core::validation::PET_TYPE_MESSAGE;

use super::envelope::ApiFailure;

/// Parsed listing request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListParams {
    pub filters: ClientFilters,
    pub order: ClientOrder,
}

/// Parse query pairs. `petType` and `petTypes` may repeat and may hold
/// comma-joined values; blank text filters are ignored.
pub fn parse_list_params(pairs: &[(String, String)]) -> Result<ListParams, ApiFailure> {
    let mut filters = ClientFilters::default();
    let mut sort_by = None;
    let mut direction = SortDirection::default();

    for (key, value) in pairs {
        match key.as_str() {
            "name" => filters.name = non_blank(value),
            "petName" => filters.pet_name = non_blank(value),
            "petType" | "petTypes" => {
                for raw in value.split(',').map(str::trim).filter(|s| !s.is_empty()) {
                    let pet_type = raw.parse::<PetType>().map_err(|_| {
                        ApiFailure::bad_request(
                            "Invalid petType filter",
                            Some(vec![PET_TYPE_MESSAGE.to_string()]),
                        )
                    })?;
                    if !filters.pet_types.contains(&pet_type) {
                        filters.pet_types.push(pet_type);
                    }
                }
            }
            "sortBy" => {
                sort_by = match value.trim() {
                    "" => None,
                    raw => Some(raw.parse::<ClientSortBy>().map_err(invalid_sort)?),
                }
            }
            "sortDirection" => {
                if !value.trim().is_empty() {
                    direction = value.trim().parse().map_err(invalid_sort)?;
                }
            }
            _ => {}
        }
    }

    let order = match sort_by {
        Some(sort_by) => ClientOrder::By { sort_by, direction },
        None => ClientOrder::Newest,
    };

    Ok(ListParams { filters, order })
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn invalid_sort(detail: String) -> ApiFailure {
    ApiFailure::bad_request("Invalid sort parameter", Some(vec![detail]))
}
