//! Mapping tables for the standard document set.
//!
//! Cell addresses here are the contract with the office templates under the
//! configured template directory. Moving a field in a template means moving
//! it here.

use super::{
    AccessResult, CellMapping, DocumentCode, DocumentDefinition, linked_case, opt_date,
    opt_integer, opt_number, opt_text, text,
};
use crate::context::DocumentContext;
use crate::era::format_wareki;
use crate::utils::sanitize_file_component;

const CERTIFICATE_SHEET: &str = "証明書";
const TERMS_SHEET: &str = "雇用条件";
const EMPLOYER_SHEET: &str = "企業情報";
const RECOMMENDATION_SHEET: &str = "推薦書";

fn student_name(ctx: &DocumentContext) -> AccessResult {
    text(ctx.student().display_name())
}

fn birth_date_wareki(ctx: &DocumentContext) -> AccessResult {
    Ok(ctx.student().birth_date.map(|d| format_wareki(d).into()))
}

fn issued_on_wareki(ctx: &DocumentContext) -> AccessResult {
    text(format_wareki(ctx.issued_on()))
}

fn school_name(ctx: &DocumentContext) -> AccessResult {
    text(ctx.school().name.as_str())
}

fn school_principal(ctx: &DocumentContext) -> AccessResult {
    text(format!("校長　{}", ctx.school().principal))
}

fn output_name(title: &str, ctx: &DocumentContext) -> String {
    format!(
        "{}_{}.xlsx",
        title,
        sanitize_file_component(&ctx.subject_display_name())
    )
}

static ENROLLMENT_CERTIFICATE: &[CellMapping] = &[
    CellMapping::date("issued_on", CERTIFICATE_SHEET, "G2", |ctx| {
        opt_date(Some(ctx.issued_on()))
    }),
    CellMapping::text("student_name", CERTIFICATE_SHEET, "C6", student_name),
    CellMapping::text("name_kana", CERTIFICATE_SHEET, "C7", |ctx| {
        opt_text(ctx.student().name_kana.as_deref())
    }),
    CellMapping::text("nationality", CERTIFICATE_SHEET, "C8", |ctx| {
        opt_text(ctx.student().nationality.as_deref())
    }),
    CellMapping::text("birth_date", CERTIFICATE_SHEET, "C9", birth_date_wareki),
    CellMapping::text("gender", CERTIFICATE_SHEET, "C10", |ctx| {
        opt_text(ctx.student().gender.as_deref())
    }),
    CellMapping::text("course", CERTIFICATE_SHEET, "C11", |ctx| {
        opt_text(ctx.student().course.as_deref())
    }),
    CellMapping::date("enrolled_on", CERTIFICATE_SHEET, "C12", |ctx| {
        opt_date(ctx.student().enrolled_on)
    }),
    CellMapping::date("expected_graduation", CERTIFICATE_SHEET, "C13", |ctx| {
        opt_date(ctx.student().expected_graduation)
    }),
    CellMapping::text("school_name", CERTIFICATE_SHEET, "C18", school_name),
    CellMapping::text("school_principal", CERTIFICATE_SHEET, "C19", school_principal),
    CellMapping::text("school_address", CERTIFICATE_SHEET, "C20", |ctx| {
        text(ctx.school().address.as_str())
    }),
    CellMapping::text("school_phone", CERTIFICATE_SHEET, "C21", |ctx| {
        opt_text(ctx.school().phone.as_deref())
    }),
];

static ATTENDANCE_CERTIFICATE: &[CellMapping] = &[
    CellMapping::date("issued_on", CERTIFICATE_SHEET, "G2", |ctx| {
        opt_date(Some(ctx.issued_on()))
    }),
    CellMapping::text("student_name", CERTIFICATE_SHEET, "C6", student_name),
    CellMapping::text("nationality", CERTIFICATE_SHEET, "C7", |ctx| {
        opt_text(ctx.student().nationality.as_deref())
    }),
    CellMapping::text("course", CERTIFICATE_SHEET, "C8", |ctx| {
        opt_text(ctx.student().course.as_deref())
    }),
    CellMapping::date("enrolled_on", CERTIFICATE_SHEET, "C9", |ctx| {
        opt_date(ctx.student().enrolled_on)
    }),
    CellMapping::number("attendance_rate", CERTIFICATE_SHEET, "C10", |ctx| {
        opt_number(ctx.student().attendance_rate)
    }),
    CellMapping::text("jlpt_level", CERTIFICATE_SHEET, "C11", |ctx| {
        opt_text(ctx.student().jlpt_level.as_deref())
    }),
    CellMapping::text("school_name", CERTIFICATE_SHEET, "C18", school_name),
    CellMapping::text("school_principal", CERTIFICATE_SHEET, "C19", school_principal),
];

static EMPLOYMENT_TERMS: &[CellMapping] = &[
    CellMapping::text("student_name", TERMS_SHEET, "C4", student_name),
    CellMapping::text("nationality", TERMS_SHEET, "C5", |ctx| {
        opt_text(ctx.student().nationality.as_deref())
    }),
    CellMapping::text("residence_card_number", TERMS_SHEET, "C6", |ctx| {
        opt_text(ctx.student().residence_card_number.as_deref())
    }),
    CellMapping::text("job_title", TERMS_SHEET, "C8", |ctx| {
        opt_text(linked_case(ctx)?.job_title.as_deref())
    }),
    CellMapping::text("work_location", TERMS_SHEET, "C9", |ctx| {
        opt_text(linked_case(ctx)?.work_location.as_deref())
    }),
    CellMapping::number("monthly_salary", TERMS_SHEET, "C10", |ctx| {
        opt_integer(linked_case(ctx)?.monthly_salary)
    }),
    CellMapping::number("weekly_hours", TERMS_SHEET, "C11", |ctx| {
        opt_number(linked_case(ctx)?.weekly_hours)
    }),
    CellMapping::date("contract_start", TERMS_SHEET, "C12", |ctx| {
        opt_date(linked_case(ctx)?.contract_start)
    }),
    CellMapping::date("contract_end", TERMS_SHEET, "C13", |ctx| {
        opt_date(linked_case(ctx)?.contract_end)
    }),
    CellMapping::text("company_name", EMPLOYER_SHEET, "C4", |ctx| {
        text(ctx.company().name.as_str())
    }),
    CellMapping::text("representative", EMPLOYER_SHEET, "C5", |ctx| {
        opt_text(ctx.company().representative.as_deref())
    }),
    CellMapping::text("postal_code", EMPLOYER_SHEET, "C6", |ctx| {
        opt_text(ctx.company().postal_code.as_deref())
    }),
    CellMapping::text("company_address", EMPLOYER_SHEET, "C7", |ctx| {
        opt_text(ctx.company().address.as_deref())
    }),
    CellMapping::text("company_phone", EMPLOYER_SHEET, "C8", |ctx| {
        opt_text(ctx.company().phone.as_deref())
    }),
    CellMapping::text("industry", EMPLOYER_SHEET, "C9", |ctx| {
        opt_text(ctx.company().industry.as_deref())
    }),
    CellMapping::number("employee_count", EMPLOYER_SHEET, "C10", |ctx| {
        opt_integer(ctx.company().employee_count)
    }),
];

static RECOMMENDATION_LETTER: &[CellMapping] = &[
    CellMapping::text("issued_on", RECOMMENDATION_SHEET, "F3", issued_on_wareki),
    CellMapping::text("addressee", RECOMMENDATION_SHEET, "B5", |ctx| {
        text(format!("{}　御中", ctx.company().name))
    }),
    CellMapping::text("student_name", RECOMMENDATION_SHEET, "B8", student_name),
    CellMapping::text("birth_date", RECOMMENDATION_SHEET, "B9", birth_date_wareki),
    CellMapping::text("nationality", RECOMMENDATION_SHEET, "B10", |ctx| {
        opt_text(ctx.student().nationality.as_deref())
    }),
    CellMapping::text("course", RECOMMENDATION_SHEET, "B11", |ctx| {
        opt_text(ctx.student().course.as_deref())
    }),
    CellMapping::number("attendance_rate", RECOMMENDATION_SHEET, "B12", |ctx| {
        opt_number(ctx.student().attendance_rate)
    }),
    CellMapping::text("jlpt_level", RECOMMENDATION_SHEET, "B13", |ctx| {
        opt_text(ctx.student().jlpt_level.as_deref())
    }),
    CellMapping::text("school_name", RECOMMENDATION_SHEET, "E20", school_name),
    CellMapping::text("school_principal", RECOMMENDATION_SHEET, "E21", school_principal),
];

pub static STANDARD_DOCUMENTS: &[DocumentDefinition] = &[
    DocumentDefinition {
        code: DocumentCode::EnrollmentCertificate,
        title: "在学証明書",
        template_file: "enrollment_certificate.xlsx",
        mappings: ENROLLMENT_CERTIFICATE,
        output_name: |ctx| output_name("在学証明書", ctx),
    },
    DocumentDefinition {
        code: DocumentCode::AttendanceCertificate,
        title: "出席証明書",
        template_file: "attendance_certificate.xlsx",
        mappings: ATTENDANCE_CERTIFICATE,
        output_name: |ctx| output_name("出席証明書", ctx),
    },
    DocumentDefinition {
        code: DocumentCode::EmploymentTerms,
        title: "雇用条件書",
        template_file: "employment_terms.xlsx",
        mappings: EMPLOYMENT_TERMS,
        output_name: |ctx| {
            format!(
                "雇用条件書_{}_{}.xlsx",
                sanitize_file_component(&ctx.company().name),
                sanitize_file_component(&ctx.subject_display_name())
            )
        },
    },
    DocumentDefinition {
        code: DocumentCode::RecommendationLetter,
        title: "推薦書",
        template_file: "recommendation_letter.xlsx",
        mappings: RECOMMENDATION_LETTER,
        output_name: |ctx| output_name("推薦書", ctx),
    },
];
