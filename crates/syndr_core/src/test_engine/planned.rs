//! Procedure names that test-definition files may reference but that have
//! no implementation yet. They dispatch as "not callable".

/// `(name, description)`; an empty description means none was recorded.
#[rustfmt::skip]
pub const PLANNED_PROCEDURES: &[(&str, &str)] = &[
    ("run_e2e_bulk_adds", "Bulk ADD queries"),
    ("run_e2e_adds_with_invalid_data", "ADD queries with invalid data"),
    ("run_e2e_adds_with_duplicate_ids", "ADD queries with duplicate IDs"),
    ("run_e2e_adds_with_missing_required_fields", "ADD queries with missing required fields"),
    ("run_e2e_adds_with_null_values", "ADD queries with NULL values"),
    ("run_e2e_adds_with_bad_fields", "ADD queries with bad fields"),
    ("run_e2e_adds_with_bad_field_types", "ADD queries with bad field types"),
    ("run_e2e_adds_with_extremely_large_documents", "ADD queries with extremely large documents"),
    ("run_e2e_adds_with_special_characters_in_text_fields", "ADD queries with special characters in text fields"),
    ("run_e2e_adds_with_that_violate_is_unique", "ADD queries with that violate is Unique"),
    ("run_e2e_adds_with_string_field_that_has_default_value", "ADD queries with string field that has default value"),
    ("run_e2e_adds_with_int_field_that_has_default_value", "ADD queries with int field that has default value"),
    ("run_e2e_adds_with_bool_field_that_has_default_value", "ADD queries with bool field that has default value"),
    ("run_e2e_adds_with_float_field_that_has_default_value", "ADD queries with float field that has default value"),
    ("run_e2e_adds_with_date_field_that_has_default_value", "ADD queries with date field that has default value"),
    ("run_e2e_simple_updates", "Simple UPDATE queries"),
    ("run_e2e_bulk_updates", "Bulk UPDATE queries"),
    ("run_e2e_updates_with_invalid_data", "UPDATE queries with invalid data"),
    ("run_e2e_updates_with_missing_required_fields", "UPDATE queries with missing required fields"),
    ("run_e2e_updates_with_null_values", "UPDATE queries with NULL values"),
    ("run_e2e_updates_with_bad_fields", "UPDATE queries with bad fields"),
    ("run_e2e_updates_with_bad_field_types", "UPDATE queries with bad field types"),
    ("run_e2e_updates_with_joins", "UPDATE queries with joins"),
    ("run_e2e_updates_with_special_characters_in_text_fields", "UPDATE queries with special characters in text fields"),
    ("run_e2e_updates_that_violate_is_unique", "UPDATE queries that violate is Unique"),
    ("run_e2e_updates_with_extremely_large_documents", "UPDATE queries with extremely large documents"),
    ("run_e2e_updates_with_duplicate_ids", "UPDATE queries with duplicate IDs"),
    ("run_e2e_updates_with_single_filter_criteria", "UPDATE queries with Single filter criteria"),
    ("run_e2e_updates_with_multiple_filter_criteria", "UPDATE queries with Multiple filter criteria"),
    ("run_e2e_updates_with_null_filter_criteria", "UPDATE queries with NULL filter criteria"),
    ("run_e2e_updates_with_joins_and_single_filter_criteria", "UPDATE queries with joins and single filter criteria"),
    ("run_e2e_updates_with_joins_and_multiple_filter_criteria", "UPDATE queries with joins and multiple filter criteria"),
    ("run_e2e_updates_with_joins_and_null_filter_criteria", "UPDATE queries with joins and NULL filter criteria"),
    ("run_e2e_updates_with_contains_filter_criteria", "UPDATE queries with Contains filter criteria"),
    ("run_e2e_updates_with_joins_and_contains_filter_criteria", "UPDATE queries with joins and Contains filter criteria"),
    ("run_e2e_selects_count_with_joins", "Selects COUNT(*) with joins"),
    ("run_e2e_selects_count_with_joins_and_single_filter", "Selects COUNT(*) with joins and single filter"),
    ("run_e2e_selects_count_with_joins_and_multiple_filters", "Selects COUNT(*) with joins and multiple filters"),
    ("run_e2e_selects_with_field_list", "Selects with field list"),
    ("run_e2e_selects_with_field_list_and_single_filter", "Selects with field list and single filter"),
    ("run_e2e_selects_with_field_list_and_multiple_filters", "Selects with field list and multiple filters"),
    ("run_e2e_selects_with_field_list_with_joins_and_single_filter", "Selects with field list with joins and single filter"),
    ("run_e2e_selects_with_field_list_with_joins_and_multiple_filters", "Selects with field list with joins and multiple filters"),
    ("run_e2e_selects_with_field_list_and_single_null_filter", "Selects with field list and single NULL filter"),
    ("run_e2e_selects_with_field_list_and_multiple_null_filters", "Selects with field list and multiple NULL filters"),
    ("run_e2e_selects_with_field_list_with_joins_and_single_null_filter", "Selects with joins and single null filter"),
    ("run_e2e_selects_with_field_list_with_joins_and_multiple_null_filters", "Selects with joins and multiple null filters"),
    ("run_e2e_selects_with_field_list_and_single_contains_filter", "Selects with field list and single CONTAINS filter"),
    ("run_e2e_selects_with_field_list_and_multiple_contains_filters", "Selects with field list and multiple CONTAINS filters"),
    ("run_e2e_selects_with_field_list_with_joins_and_single_contains_filter", "Selects with joins and single CONTAINS filter"),
    ("run_e2e_selects_with_field_list_with_joins_and_multiple_contains_filters", "Selects with joins and multiple CONTAINS filters"),
    ("run_e2e_simple_deletes", "Simple DELETE queries"),
    ("run_e2e_bulk_deletes", "Bulk DELETE queries"),
    ("run_e2e_deletes_with_filtered_null_values", "DELETE queries with filtered NULL values"),
    ("run_e2e_deletes_with_bad_field_types", "DELETE queries with bad field types"),
    ("run_e2e_deletes_with_joins", "DELETE queries with joins"),
    ("run_e2e_deletes_with_single_filter", "DELETE queries with single filter"),
    ("run_e2e_deletes_with_multiple_filters", "DELETE queries with multiple filters"),
    ("run_e2e_deletes_with_joins_and_single_filter", "DELETE queries with joins and single filter"),
    ("run_e2e_deletes_with_joins_and_multiple_filters", "DELETE queries with joins and multiple filters"),
    ("run_e2e_deletes_with_contains_filter", "DELETE queries with CONTAINS filter"),
    ("run_e2e_deletes_with_extremely_large_documents", "DELETE queries with extremely large documents"),
    ("run_e2e_deletes_that_are_child_records_in_joins", "DELETE queries that are child records in joins"),
    ("run_e2e_deletes_that_are_parent_records_in_joins", "DELETE queries that are parent records in joins"),
    ("run_e2e_simple_add_bundles", "Simple ADD BUNDLE query"),
    ("run_e2e_simple_add_bundles_with_invalid_bundle_name", "Simple ADD BUNDLE with invalid bundle name"),
    ("run_e2e_simple_add_bundle_with_string_field", "Simple ADD BUNDLE query with string field"),
    ("run_e2e_simple_add_bundle_with_int_field", "Simple ADD BUNDLE with int field"),
    ("run_e2e_simple_add_bundle_with_bool_field", "Simple ADD BUNDLE with BOOL field"),
    ("run_e2e_simple_add_bundle_with_float_field", "Simple ADD BUNDLE with float field"),
    ("run_e2e_simple_add_bundle_with_date_field", "Simple ADD BUNDLE with date field"),
    ("run_e2e_simple_add_bundle_with_required_string_field", "Simple ADD BUNDLE query with REQUIRED string field"),
    ("run_e2e_simple_add_bundle_with_required_int_field", "Simple ADD BUNDLE with REQUIRED int field"),
    ("run_e2e_simple_add_bundle_with_required_bool_field", "Simple ADD BUNDLE with REQUIRED bool field"),
    ("run_e2e_simple_add_bundle_with_required_float_field", "Simple ADD BUNDLE with REQUIRED float field"),
    ("run_e2e_simple_add_bundle_with_required_date_field", "Simple ADD BUNDLE with REQUIRED date field"),
    ("run_e2e_simple_add_bundle_with_unique_string_field", "Simple ADD BUNDLE query with Unique string field"),
    ("run_e2e_simple_add_bundle_with_unique_int_field", "Simple ADD BUNDLE query with Unique int field"),
    ("run_e2e_simple_add_bundle_with_unique_bool_field", "Simple ADD BUNDLE with unique bool field"),
    ("run_e2e_simple_add_bundle_with_unique_float_field", "Simple ADD BUNDLE with unique float field"),
    ("run_e2e_simple_add_bundle_with_unique_date_field", "Simple ADD BUNDLE with unique date field"),
    ("run_e2e_bulk_add_bundles", "Bulk ADD BUNDLE queries"),
    ("run_e2e_add_bundles_with_invalid_data", "ADD BUNDLE queries with invalid data"),
    ("run_e2e_add_bundles_with_duplicate_ids", "ADD BUNDLE queries with duplicate IDs"),
    ("run_e2e_add_bundles_with_missing_required_fields", "ADD BUNDLE queries with missing required fields"),
    ("run_e2e_add_bundles_with_null_values", "ADD BUNDLE queries with NULL values"),
    ("run_e2e_simple_Update_bundles", ""),
    ("run_e2e_simple_Update_bundles_with_new_1ToMany_relationship", ""),
    ("run_e2e_simple_Update_bundles_with_new_0ToMany_relationship", ""),
    ("run_e2e_simple_Update_bundles_with_new_1ToOne_relationship", ""),
    ("run_e2e_simple_Update_bundles_with_new_ManyToMany_relationship", ""),
    ("run_e2e_simple_Update_bundles_with_invalid_bundle_name", ""),
    ("run_e2e_simple_Update_bundle_with_string_field", ""),
    ("run_e2e_simple_Update_bundle_with_int_field", ""),
    ("run_e2e_simple_Update_bundle_with_bool_field", ""),
    ("run_e2e_simple_Update_bundle_with_float_field", ""),
    ("run_e2e_simple_Update_bundle_with_date_field", ""),
    ("run_e2e_simple_Update_bundle_with_required_string_field", ""),
    ("run_e2e_simple_Update_bundle_with_required_int_field", ""),
    ("run_e2e_simple_Update_bundle_with_required_bool_field", ""),
    ("run_e2e_simple_Update_bundle_with_required_float_field", ""),
    ("run_e2e_simple_Update_bundle_with_required_date_field", ""),
    ("run_e2e_simple_Update_bundle_with_unique_string_field", ""),
    ("run_e2e_simple_Update_bundle_with_unique_int_field", ""),
    ("run_e2e_simple_Update_bundle_with_unique_bool_field", ""),
    ("run_e2e_simple_Update_bundle_with_unique_float_field", ""),
    ("run_e2e_simple_Update_bundle_with_unique_date_field", ""),
    ("run_e2e_bulk_Update_bundles", ""),
    ("run_e2e_Update_bundles_with_invalid_data", ""),
    ("run_e2e_Update_bundles_with_duplicate_ids", ""),
    ("run_e2e_Update_bundles_with_missing_required_fields", ""),
    ("run_e2e_Update_bundles_with_null_values", ""),
    ("run_e2e_Update_bundles_add_valid_field_with_valid_field_name", ""),
    ("run_e2e_Update_bundles_add_valid_field_with_invalid_field_name", ""),
    ("run_e2e_Update_bundles_update_field_with_valid_field_name", ""),
    ("run_e2e_Update_bundles_update_field_with_invalid_field_name", ""),
    ("run_e2e_Update_bundles_add_valid_field_string_type", ""),
    ("run_e2e_Update_bundles_add_valid_field_int_type", ""),
    ("run_e2e_Update_bundles_add_valid_field_bool_type", ""),
    ("run_e2e_Update_bundles_add_valid_field_date_type", ""),
    ("run_e2e_Update_bundles_add_valid_field_float_type", ""),
    ("run_e2e_Update_bundles_add_required_valid_field_string_type", ""),
    ("run_e2e_Update_bundles_add_required_valid_field_int_type", ""),
    ("run_e2e_Update_bundles_add_required_valid_field_bool_type", ""),
    ("run_e2e_Update_bundles_add_required_valid_field_date_type", ""),
    ("run_e2e_Update_bundles_add_required_valid_field_float_type", ""),
    ("run_e2e_Update_bundles_add_unique_valid_field_string_type", ""),
    ("run_e2e_Update_bundles_add_unique_valid_field_int_type", ""),
    ("run_e2e_Update_bundles_add_unique_valid_field_bool_type", ""),
    ("run_e2e_Update_bundles_add_unique_valid_field_date_type", ""),
    ("run_e2e_Update_bundles_add_unique_valid_field_float_type", ""),
    ("run_e2e_Update_bundles_add_default_value_valid_field_string_type", ""),
    ("run_e2e_Update_bundles_add_default_value_valid_field_int_type", ""),
    ("run_e2e_Update_bundles_add_default_value_valid_field_bool_type", ""),
    ("run_e2e_Update_bundles_add_default_value_valid_field_date_type", ""),
    ("run_e2e_Update_bundles_add_default_value_valid_field_float_type", ""),
    ("run_e2e_Update_bundles_update_required_valid_field_string_type", ""),
    ("run_e2e_Update_bundles_update_required_valid_field_int_type", ""),
    ("run_e2e_Update_bundles_update_required_valid_field_bool_type", ""),
    ("run_e2e_Update_bundles_update_required_valid_field_date_type", ""),
    ("run_e2e_Update_bundles_update_required_valid_field_float_type", ""),
    ("run_e2e_Update_bundles_update_unique_valid_field_string_type", ""),
    ("run_e2e_Update_bundles_update_unique_valid_field_int_type", ""),
    ("run_e2e_Update_bundles_update_unique_valid_field_bool_type", ""),
    ("run_e2e_Update_bundles_update_unique_valid_field_date_type", ""),
    ("run_e2e_Update_bundles_update_unique_valid_field_float_type", ""),
    ("run_e2e_Update_bundles_update_default_value_valid_field_string_type", ""),
    ("run_e2e_Update_bundles_update_default_value_valid_field_int_type", ""),
    ("run_e2e_Update_bundles_update_default_value_valid_field_bool_type", ""),
    ("run_e2e_Update_bundles_update_default_value_valid_field_date_type", ""),
    ("run_e2e_Update_bundles_update_default_value_valid_field_float_type", ""),
    ("run_e2e_simple_Delete_bundles", ""),
    ("run_e2e_simple_Delete_bundles_with_invalid_bundle_name", ""),
];
