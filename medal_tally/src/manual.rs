/*!

This is the long-form manual for `medal_tally` and `medalatlas`.

## Inputs

Three datasets are combined:
* the results table: one row per result, with a year, a country and optionally a gender and a medal count
* the geographic boundaries: a GeoJSON collection of regions
* the cross-reference table: maps country codes and names to the identifiers of the regions

### Results table

The table is read as CSV (`csv`, the default) or as an Excel workbook (`xlsx`). For each
field, the columns are checked in the order below and the first non-empty value is used:

| field       | candidate columns                          | when absent               |
|-------------|--------------------------------------------|---------------------------|
| year        | `Year`                                     | the row is skipped        |
| code        | `ISO_Code`, `ISO3`, `NOC`, `Country_Code`  | the name is used          |
| name        | `Country_Name`, `Country`, `Team`          | the code is displayed     |
| gender      | `Gender`, `Sex`                            | `Unknown`                 |
| medal count | `Medal_Count`, `Total_Medals`, `Medals`    | the row counts as 1 medal |

The table must contain a year column and at least one code or name column.

### Geographic boundaries

Each feature is identified by the first usable value among:
* an ISO alpha-3 code: `ISO_A3`, `iso_a3`, `ADM0_A3` (the `-99` placeholder is ignored)
* a numeric id: the `id` of the feature, `ISO_N3`, `iso_n3`
* a name: `name`, `NAME`, `ADMIN`

### Cross-reference table

A CSV file with one or more key columns (default: `NOC`, `Code`, `Country`, `Country_Name`)
and a canonical column (default: `ISO_Code`, `ISO3`, `iso`). Each key of a row maps to the
canonical id of the row. Rows without a canonical id are ignored.

## Resolution of countries

A result row is attached to a region by its join key. The key is found by checking, in order:
1. the code of the row in the table of historical nations ([`HISTORICAL_OVERRIDES`](crate::HISTORICAL_OVERRIDES))
2. the code in the cross-reference table
3. the name of the row in the table of historical nations
4. the name in the cross-reference table

All the lookups ignore case and surrounding spaces. The canonical ids of the cross-reference
table, the alpha-3 codes of the regions and the names of the resolved regions are also known
to the resolver.

The regions of the map go through the same resolver: alpha-3 code, numeric id, then name.
Boundaries keyed only by numeric ids (as in TopoJSON world atlases) need these ids in the
cross-reference table.
A row that cannot be resolved is still counted in the country ranking and the gender totals,
and reported in the diagnostics.

## Views

For the selected year (or all years):
* region totals: the sum of the medals of the resolved rows, per join key
* country ranking: the 10 countries with the most medals. Ties are listed in order of first appearance.
* gender totals: the sum of the medals per gender

```
use medal_tally::builder::Builder;
use medal_tally::YearFilter;

let mut builder = Builder::new();
builder.add_result(2012, Some("USA"), None, Some("Men"), None);
builder.add_result(2012, Some("USA"), None, Some("Women"), None);
builder.add_result(2012, Some("CHN"), None, Some("Women"), None);

let (mut controller, _) = builder.build();
let views = controller.set_filter(YearFilter::SpecificYear(2012));
assert_eq!(
    views.country_ranking.entries,
    vec![("USA".to_string(), 2.0), ("CHN".to_string(), 1.0)]
);
assert_eq!(views.gender_totals.entries[0], ("Women".to_string(), 2.0));
assert!(controller.set_filter(YearFilter::SpecificYear(1900)).is_empty());
```

*/
