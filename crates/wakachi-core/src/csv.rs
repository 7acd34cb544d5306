//! Single-row CSV splitting for dictionary sources.

use csv_core::{ReadFieldResult, Reader};

/// Split one CSV row into fields, honoring double-quoted cells.
///
/// Returns `None` if a field is not valid UTF-8 or exceeds the scratch buffer.
pub(crate) fn parse_row(row: &str) -> Option<Vec<String>> {
    let mut fields = Vec::new();
    let mut rdr = Reader::new();
    let mut bytes = row.as_bytes();
    let mut output = [0u8; 4096];
    loop {
        let (result, nin, nout) = rdr.read_field(bytes, &mut output);
        fields.push(std::str::from_utf8(&output[..nout]).ok()?.to_string());
        bytes = &bytes[nin..];
        match result {
            ReadFieldResult::Field { record_end: false } => {
                // A trailing separator closes one last, empty field.
                if bytes.is_empty() {
                    fields.push(String::new());
                    break;
                }
            }
            ReadFieldResult::Field { record_end: true }
            | ReadFieldResult::InputEmpty
            | ReadFieldResult::End => break,
            ReadFieldResult::OutputFull => return None,
        }
    }
    Some(fields)
}
