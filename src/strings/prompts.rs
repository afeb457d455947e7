//! # Prompts
//!
//! Tool descriptions published to the model and the built-in session prompt used when
//! no template file is present.

pub const READ_FILE_DESCRIPTION: &str = "Read the contents of a text file. Reads the entire file, or the given number of bytes from the start. Image and video files cannot be read. Access is restricted to the movies, shows and source folders.";

pub const LIST_DIRECTORY_DESCRIPTION: &str = "List the contents of a directory without recursing. Select a folder with 'type' ('movies', 'shows' or 'source') and an optional relative 'subpath', or give an absolute 'path'. Directories end with '/', files show their size in bytes.";

pub const COPY_FILE_DESCRIPTION: &str = "Copy a file to a new location. The source may be in any permitted folder; the destination must be inside the movies or shows folder. Missing destination folders are created and an existing destination file is overwritten. The source is left in place.";

pub const RENAME_MEDIA_DESCRIPTION: &str = "Move or rename a file or folder. The destination must be inside the movies or shows folder and must not already exist. Missing destination folders are created.";

pub const SEARCH_IMDB_DESCRIPTION: &str = "Search for a title on IMDb. Returns a JSON object mapping 'Title (year)' to the IMDb id and a short description (kind and main cast).";

/// Placeholders: InputPath, MoviesFolder, ShowsFolder, SourceFolder, JellyfinDocs.
pub const DEFAULT_TEMPLATE: &str = r#"You are organizing media files into a Jellyfin library.

The media to organize is at: {{InputPath}}

Library folders:
- Movies: {{MoviesFolder}}
- Shows: {{ShowsFolder}}
- Source (scan) folder: {{SourceFolder}}

Use the tools to inspect the input, look up each title on IMDb, and copy or move the files
into the library using Jellyfin naming. Include the IMDb id in folder names, for example
"Film (2020) [imdbid-tt0000000]". Always use absolute paths. Never overwrite existing
library entries; if a destination already exists, ask the operator what to do.

When you are unsure how to name something, ask the operator before acting.

Jellyfin naming documentation:

{{JellyfinDocs}}
"#;
