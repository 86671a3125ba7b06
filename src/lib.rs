/*!
# Part Number Lookup

A browser-based lookup over a pre-computed part-number comparison workbook,
built in Rust.

## Overview

The comparison results live in one spreadsheet. This service reads that
spreadsheet once, lets a user narrow it down from a web form, shows the
matching rows and hands the current result back as a spreadsheet download.

## Architecture

Data flows one way:

```text
 賀展_比對結果.xlsx
        │
        ▼
  ┌──────────┐
  │  loader   │  read once per process → RecordTable (cached, shared)
  └──────────┘
        │
        ▼
  ┌──────────┐
  │  filter   │  Criteria → FilteredResult (row indices, table order)
  └──────────┘
        │
        ├──────────────► app / page   (search page, JSON API)
        ▼
  ┌────────────┐
  │ downloader  │  FilteredResult → xlsx / csv bytes
  └────────────┘
```

## Search modes

- **Identifier**: exact item number (`itm_no`); when none is picked, exact
  description (`desc`). Picking an item number narrows the descriptions on
  offer.
- **Classification**: multi-select over rating, size, size unit and color;
  AND across columns, OR within a column.

Searches run either on every selection change or only when the search
button is pressed (see [`config::SearchTrigger`]).

## Modules

- **table**: cell values, the record table and the canonical column names
- **loader**: xlsx/xls/ods/csv reading and the process-wide dataset cache
- **filter**: criteria, the filter engine and widget choice helpers
- **downloader**: xlsx and csv export
- **form**: search form parameters
- **page**: view model for the search page
- **config**: command-line configuration
- **app**: HTTP routes (requires the `web` feature)

## HTTP Endpoints

- `/` - Search page
- `/api/options` - Choices for every widget, narrowed by `itm_no`/`desc`
- `/api/search` - Filtered rows as JSON
- `/export`, `/export/csv` - Download the filtered rows
*/

#[cfg(feature = "web")]
pub mod app;
pub mod config;
pub mod downloader;
pub mod error;
pub mod filter;
pub mod form;
pub mod loader;
pub mod page;
pub mod table;

pub use error::{ConfigError, ExportError, LoadError};
pub use filter::{Criteria, FilteredResult, SearchStatus, apply_filters};
pub use table::{CellValue, Classification, RecordTable};
