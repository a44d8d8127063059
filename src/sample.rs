//! Built-in demo page and matching canned speller payload.

use dom_overlay::{Document, NodeId, Rect};

pub const SAMPLE_HOST: &str = "blog.example.com";
pub const SAMPLE_TEXT: &str = "I has a pen and a apple.";

/// Speller reply for [`SAMPLE_TEXT`].
pub const SAMPLE_PAYLOAD: &str = concat!(
    "<PnuErrorWord nErrorIdx='0' m_nStart='2' m_nEnd='5'><OrgStr>has</OrgStr>",
    "<Help nCorrectMethod='2'><![CDATA[Subject-verb agreement:<br/>use \"have\" after \"I\".]]></Help>",
    "<CandWordList m_nCount='1'><CandWord>have</CandWord></CandWordList></PnuErrorWord>",
    "<PnuErrorWord nErrorIdx='1' m_nStart='16' m_nEnd='23'><OrgStr>a apple</OrgStr>",
    "<Help nCorrectMethod='4'><![CDATA[Use \"an\" before a vowel sound.]]></Help>",
    "<CandWordList m_nCount='2'><CandWord>an apple</CandWord><CandWord>the apple</CandWord>",
    "</CandWordList></PnuErrorWord>",
);

pub struct SamplePage {
    pub doc: Document,
    pub textarea: NodeId,
    pub editor: NodeId,
    pub password: NodeId,
}

/// A comment form: a textarea, a rich editor with inline markup, and a
/// password field that must never be checked.
pub fn sample_page() -> SamplePage {
    let mut doc = Document::new(SAMPLE_HOST);
    let body = doc.body();

    let form = doc.create_element("form");
    doc.append_child(body, form);

    let textarea = doc.create_element("textarea");
    doc.set_attr(textarea, "name", "comment");
    doc.set_value(textarea, SAMPLE_TEXT);
    doc.set_rect(textarea, Rect::new(10.0, 10.0, 320.0, 48.0));
    doc.append_child(form, textarea);

    let password = doc.create_element("input");
    doc.set_attr(password, "type", "password");
    doc.set_value(password, "hunter2 has typo");
    doc.append_child(form, password);

    let editor = doc.create_element("div");
    doc.set_attr(editor, "contenteditable", "true");
    doc.set_rect(editor, Rect::new(10.0, 80.0, 320.0, 96.0));
    doc.append_child(body, editor);
    let lead = doc.create_text("I has ");
    doc.append_child(editor, lead);
    let em = doc.create_element("em");
    let inner = doc.create_text("a pen");
    doc.append_child(em, inner);
    doc.append_child(editor, em);
    let tail = doc.create_text(" and a apple.");
    doc.append_child(editor, tail);

    SamplePage {
        doc,
        textarea,
        editor,
        password,
    }
}
