use anyhow::Result;
use lead_splitter::core::parser::{parse, ParseOptions};
use lead_splitter::domain::model::{Agent, FileFormat};
use lead_splitter::domain::ports::ListStore;
use lead_splitter::{LeadError, LocalStorage, MemoryStore, UploadOptions, UploadService};
use std::io::Write;
use tempfile::TempDir;
use zip::write::{SimpleFileOptions, ZipWriter};

enum Cell<'a> {
    Text(&'a str),
    Number(f64),
    Blank,
}

fn column_letter(index: usize) -> char {
    (b'A' + index as u8) as char
}

fn sheet_xml(rows: &[Vec<Cell>]) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>"#,
    );
    for (r, row) in rows.iter().enumerate() {
        xml.push_str(&format!(r#"<row r="{}">"#, r + 1));
        for (c, cell) in row.iter().enumerate() {
            let reference = format!("{}{}", column_letter(c), r + 1);
            match cell {
                Cell::Text(text) => xml.push_str(&format!(
                    r#"<c r="{}" t="inlineStr"><is><t>{}</t></is></c>"#,
                    reference, text
                )),
                Cell::Number(value) => {
                    xml.push_str(&format!(r#"<c r="{}"><v>{}</v></c>"#, reference, value))
                }
                Cell::Blank => {}
            }
        }
        xml.push_str("</row>");
    }
    xml.push_str("</sheetData></worksheet>");
    xml
}

/// 用 zip 組出最小可讀的 xlsx 活頁簿
fn build_xlsx(sheets: &[(&str, Vec<Vec<Cell>>)]) -> Vec<u8> {
    let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();

    let mut content_types = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
<Default Extension="xml" ContentType="application/xml"/>
<Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>"#,
    );
    let mut workbook = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets>"#,
    );
    let mut workbook_rels = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    );

    for (i, (name, _)) in sheets.iter().enumerate() {
        let n = i + 1;
        content_types.push_str(&format!(
            r#"<Override PartName="/xl/worksheets/sheet{}.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#,
            n
        ));
        workbook.push_str(&format!(
            r#"<sheet name="{}" sheetId="{}" r:id="rId{}"/>"#,
            name, n, n
        ));
        workbook_rels.push_str(&format!(
            r#"<Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet{}.xml"/>"#,
            n, n
        ));
    }
    content_types.push_str("</Types>");
    workbook.push_str("</sheets></workbook>");
    workbook_rels.push_str("</Relationships>");

    let mut add = |path: &str, body: &str| {
        zip.start_file(path, options).unwrap();
        zip.write_all(body.as_bytes()).unwrap();
    };
    add("[Content_Types].xml", &content_types);
    add(
        "_rels/.rels",
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#,
    );
    add("xl/workbook.xml", &workbook);
    add("xl/_rels/workbook.xml.rels", &workbook_rels);
    for (i, (_, rows)) in sheets.iter().enumerate() {
        add(&format!("xl/worksheets/sheet{}.xml", i + 1), &sheet_xml(rows));
    }

    zip.finish().unwrap().into_inner()
}

fn leads_sheet() -> Vec<Vec<Cell<'static>>> {
    vec![
        vec![Cell::Text("firstName"), Cell::Text("PHONE"), Cell::Text("Notes")],
        vec![Cell::Text("Ada"), Cell::Number(5550101.0), Cell::Text("warm")],
        vec![Cell::Blank, Cell::Blank, Cell::Blank],
        vec![Cell::Text("Bob"), Cell::Number(5550102.0), Cell::Blank],
        vec![Cell::Text("Cy"), Cell::Text("555-0103"), Cell::Text("call back")],
    ]
}

#[test]
fn test_xlsx_first_sheet_only() -> Result<()> {
    let bytes = build_xlsx(&[
        ("Leads", leads_sheet()),
        (
            "Archive",
            vec![
                vec![Cell::Text("FirstName"), Cell::Text("Phone"), Cell::Text("Notes")],
                vec![Cell::Text("Old"), Cell::Number(1.0), Cell::Text("ignored")],
            ],
        ),
    ]);

    let table = parse(&bytes, FileFormat::Xlsx, &ParseOptions::default())?;

    assert_eq!(table.headers, vec!["firstName", "PHONE", "Notes"]);
    assert_eq!(table.rows.len(), 3);
    assert_eq!(table.rows[0].get("firstName"), Some("Ada"));
    assert_eq!(table.rows[0].get("PHONE"), Some("5550101"));
    assert_eq!(table.rows[1].get("Notes"), Some(""));
    assert_eq!(table.rows[2].get("PHONE"), Some("555-0103"));
    Ok(())
}

#[test]
fn test_xlsx_missing_column_rejected() {
    let bytes = build_xlsx(&[(
        "Leads",
        vec![
            vec![Cell::Text("FirstName"), Cell::Text("Email")],
            vec![Cell::Text("Ada"), Cell::Text("ada@example.com")],
        ],
    )]);

    let err = lead_splitter::core::upload::prepare_leads(
        &bytes,
        FileFormat::Xlsx,
        &UploadOptions::default(),
    )
    .unwrap_err();

    match err {
        LeadError::MissingColumns { columns } => assert_eq!(columns, vec!["Phone", "Notes"]),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_xlsx_upload_distributes_in_sheet_order() -> Result<()> {
    let temp_dir = TempDir::new()?;
    std::fs::write(
        temp_dir.path().join("leads.xlsx"),
        build_xlsx(&[("Leads", leads_sheet())]),
    )?;

    let store = MemoryStore::with_agents(vec![
        Agent {
            id: "a1".to_string(),
            name: "Asha".to_string(),
            email: "asha@example.com".to_string(),
            mobile: "1".to_string(),
        },
        Agent {
            id: "a2".to_string(),
            name: "Ben".to_string(),
            email: "ben@example.com".to_string(),
            mobile: "2".to_string(),
        },
    ]);
    let service = UploadService::new(
        LocalStorage::new(temp_dir.path()),
        store.clone(),
        store.clone(),
        UploadOptions::default(),
    );

    let summary = service.upload_file("leads.xlsx", "admin").await?;

    assert_eq!(summary.format, FileFormat::Xlsx);
    assert_eq!(summary.total_items, 3);
    let counts: Vec<usize> = summary.distributions.iter().map(|d| d.item_count).collect();
    assert_eq!(counts, vec![2, 1]);

    let asha = store.lists_for_agent("a1").await?;
    let names: Vec<&str> = asha[0].items.iter().map(|i| i.first_name.as_str()).collect();
    assert_eq!(names, vec!["Ada", "Bob"]);
    assert_eq!(store.lists_for_agent("a2").await?[0].items[0].notes, "call back");
    Ok(())
}
