//! Resume templates: render `ResumeData` into a paginatable document tree.
//!
//! Each template marks its page header (first page only) and its atomic blocks:
//! company entries (`experience`), positions (`position`), education entries
//! (`education`), skill groups (`skills`), the summary (`summary`) and description
//! bullets (`list-item`). Section wrappers are plain containers, so a section's
//! heading only appears on pages that carry some of its blocks.

use serde::{Deserialize, Serialize};

use crate::document::{el, DocumentTree, El};
use crate::resume::description::render_description;
use crate::resume::model::{CompanyExperience, Education, PersonalInfo, ResumeData};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Template {
    #[default]
    Classic,
    Modern,
    Creative,
}

impl Template {
    /// Unknown names fall back to `Classic`.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "modern" => Template::Modern,
            "creative" => Template::Creative,
            _ => Template::Classic,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Template::Classic => "classic",
            Template::Modern => "modern",
            Template::Creative => "creative",
        }
    }

    pub fn render(&self, data: &ResumeData) -> DocumentTree {
        let root = match self {
            Template::Classic => classic(data),
            Template::Modern => modern(data),
            Template::Creative => creative(data),
        };
        root.build()
    }
}

fn non_blank(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

fn link(href: &str, class: &str) -> El {
    el("a").attr("href", href).class(class).text(href)
}

fn dates(start: &str, end: &str) -> String {
    format!("{start} - {end}")
}

// ────────────────────────────────────────────────────────────────────────────
// Classic
// ────────────────────────────────────────────────────────────────────────────

const CLASSIC_H2: &str =
    "text-xl font-bold border-b border-gray-300 pb-1 mb-2 uppercase tracking-widest text-gray-900";

fn classic(data: &ResumeData) -> El {
    let info = &data.personal_info;
    el("div")
        .class("p-8 md:p-12 font-serif text-gray-800 w-full")
        .child(classic_header(info))
        .child(
            el("main")
                .child_opt(non_blank(&data.summary).map(|summary| {
                    el("section")
                        .class("mb-8")
                        .child(el("h2").class(CLASSIC_H2).text("Summary"))
                        .child(
                            el("p")
                                .atomic("summary")
                                .class("text-sm text-gray-700 leading-relaxed")
                                .text(summary),
                        )
                }))
                .child_opt((!data.experience.is_empty()).then(|| {
                    el("section")
                        .class("mb-8")
                        .child(el("h2").class(CLASSIC_H2).text("Experience"))
                        .children(data.experience.iter().map(classic_company))
                }))
                .child_opt((!data.education.is_empty()).then(|| {
                    el("section")
                        .class("mb-8")
                        .child(el("h2").class(CLASSIC_H2).text("Education"))
                        .children(data.education.iter().map(classic_education))
                }))
                .child_opt(skill_list(data).map(|skills| {
                    el("section")
                        .child(el("h2").class(CLASSIC_H2).text("Skills"))
                        .child(
                            el("div")
                                .atomic("skills")
                                .class("flex flex-wrap gap-2 mt-2")
                                .children(skills.into_iter().map(|skill| {
                                    el("span")
                                        .class("bg-gray-200 text-gray-800 text-xs font-medium px-3 py-1 rounded-full")
                                        .text(skill)
                                })),
                        )
                })),
        )
}

fn classic_header(info: &PersonalInfo) -> El {
    let contact = [&info.email, &info.phone, &info.address]
        .into_iter()
        .filter_map(|v| non_blank(v))
        .map(|v| el("span").text(v));
    let links = [&info.linkedin, &info.website]
        .into_iter()
        .filter_map(|v| non_blank(v))
        .map(|v| link(v, "break-all"));

    el("header")
        .page_header()
        .class("flex justify-between items-start border-b-2 border-gray-300 pb-4 mb-6")
        .child(
            el("div")
                .class("text-left")
                .child_opt(non_blank(&info.name).map(|name| {
                    el("h1")
                        .class("text-4xl font-bold tracking-wider uppercase text-gray-900")
                        .text(name)
                }))
                .child(
                    el("div")
                        .class("flex items-center flex-wrap mt-2 text-xs text-gray-600")
                        .children(contact),
                )
                .child(
                    el("div")
                        .class("flex items-center flex-wrap mt-1 text-xs text-blue-700")
                        .children(links),
                ),
        )
        .child_opt(non_blank(&info.photo).map(|src| {
            el("img")
                .attr("src", src)
                .attr("alt", "Profile")
                .class("w-32 h-32 rounded-full object-cover shadow-md flex-shrink-0 ml-8")
        }))
}

fn classic_company(company: &CompanyExperience) -> El {
    el("div")
        .atomic("experience")
        .class("mb-6 break-inside-avoid")
        .child(
            el("div")
                .class("flex justify-between items-baseline")
                .child(el("h3").class("text-lg font-semibold text-gray-800").text(&company.company))
                .child(el("p").class("text-md italic text-gray-700").text(&company.location)),
        )
        .children(company.positions.iter().map(|pos| {
            el("div")
                .atomic("position")
                .class("mt-2 pl-2")
                .child(
                    el("div")
                        .class("flex justify-between items-baseline")
                        .child(el("h4").class("text-md font-semibold text-gray-700").text(&pos.job_title))
                        .child(
                            el("p")
                                .class("text-sm font-light text-gray-600")
                                .text(&dates(&pos.start_date, &pos.end_date)),
                        ),
                )
                .child(render_description(&pos.description, "mt-1"))
        }))
}

fn classic_education(edu: &Education) -> El {
    el("div")
        .atomic("education")
        .class("mb-2 break-inside-avoid")
        .child(
            el("div")
                .class("flex justify-between items-baseline")
                .child(el("h3").class("text-lg font-semibold text-gray-800").text(&edu.degree))
                .child(el("p").class("text-sm font-light text-gray-600").text(&edu.graduation_date)),
        )
        .child(
            el("div")
                .class("flex justify-between items-baseline")
                .child(el("p").class("text-md italic text-gray-700").text(&edu.school))
                .child(el("p").class("text-sm font-light text-gray-600").text(&edu.location)),
        )
}

fn skill_list(data: &ResumeData) -> Option<Vec<&str>> {
    let skills: Vec<&str> = data.visible_skills().collect();
    (!skills.is_empty()).then_some(skills)
}

// ────────────────────────────────────────────────────────────────────────────
// Modern
// ────────────────────────────────────────────────────────────────────────────

const MODERN_ASIDE_H2: &str = "text-sm font-bold uppercase text-slate-500 tracking-wider mb-3";

fn modern(data: &ResumeData) -> El {
    let info = &data.personal_info;
    let contact = [&info.email, &info.phone, &info.address]
        .into_iter()
        .filter_map(|v| non_blank(v))
        .map(|v| el("div").text(v))
        .chain(
            [&info.linkedin, &info.website]
                .into_iter()
                .filter_map(|v| non_blank(v))
                .map(|v| link(v, "block hover:text-indigo-600 break-all")),
        );

    let aside = el("aside")
        .class("w-1/3 bg-slate-50 p-8 flex flex-col gap-8")
        .child(
            // Name and contact details travel together as the running header.
            el("div")
                .page_header()
                .class("flex flex-col gap-8")
                .child(el("div").child_opt(
                    non_blank(&info.name)
                        .map(|name| el("h1").class("text-3xl font-bold text-slate-900").text(name)),
                ))
                .child(
                    el("section")
                        .child(el("h2").class(MODERN_ASIDE_H2).text("Contact"))
                        .child(el("div").class("space-y-2 text-sm text-slate-700").children(contact)),
                ),
        )
        .child_opt((!data.education.is_empty()).then(|| {
            el("section")
                .child(el("h2").class(MODERN_ASIDE_H2).text("Education"))
                .children(data.education.iter().map(|edu| {
                    el("div")
                        .atomic("education")
                        .class("mb-4 break-inside-avoid")
                        .child(el("h3").class("font-semibold text-slate-800").text(&edu.degree))
                        .child(el("p").class("text-sm text-slate-600").text(&edu.school))
                        .child(el("p").class("text-xs text-slate-500").text(&edu.graduation_date))
                }))
        }))
        .child_opt(skill_list(data).map(|skills| {
            el("section")
                .child(el("h2").class(MODERN_ASIDE_H2).text("Skills"))
                .child(
                    el("ul")
                        .atomic("skills")
                        .class("list-inside list-disc text-sm text-slate-700 space-y-1")
                        .children(skills.into_iter().map(|skill| el("li").text(skill))),
                )
        }));

    let main = el("main")
        .class("w-2/3 p-8")
        .child_opt(non_blank(&data.summary).map(|summary| {
            el("section").class("mb-8").child(
                el("p")
                    .atomic("summary")
                    .class("text-md text-slate-700 leading-relaxed italic")
                    .text(summary),
            )
        }))
        .child_opt((!data.experience.is_empty()).then(|| {
            el("section")
                .child(
                    el("h2")
                        .class("text-xl font-bold text-slate-800 border-b-2 border-slate-200 pb-2 mb-4")
                        .text("Experience"),
                )
                .children(data.experience.iter().map(modern_company))
        }));

    el("div")
        .class("font-sans text-slate-800 w-full flex")
        .child(aside)
        .child(main)
}

fn modern_company(company: &CompanyExperience) -> El {
    el("div")
        .atomic("experience")
        .class("mb-6 break-inside-avoid")
        .child(
            el("div")
                .class("flex justify-between items-baseline mb-1")
                .child(el("h3").class("text-lg font-semibold text-slate-900").text(&company.company))
                .child(el("p").class("text-md text-slate-600").text(&company.location)),
        )
        .children(company.positions.iter().map(|pos| {
            el("div")
                .atomic("position")
                .class("mb-3 last:mb-0")
                .child(
                    el("div")
                        .class("flex justify-between items-baseline")
                        .child(el("h4").class("text-md font-semibold text-slate-800").text(&pos.job_title))
                        .child(
                            el("p")
                                .class("text-sm text-slate-500")
                                .text(&dates(&pos.start_date, &pos.end_date)),
                        ),
                )
                .child(render_description(&pos.description, "mt-1 text-slate-600"))
        }))
}

// ────────────────────────────────────────────────────────────────────────────
// Creative
// ────────────────────────────────────────────────────────────────────────────

const CREATIVE_H2: &str = "text-2xl font-bold text-teal-700 mb-4 uppercase tracking-wider";

fn creative(data: &ResumeData) -> El {
    let info = &data.personal_info;
    let contact = [&info.email, &info.phone, &info.address]
        .into_iter()
        .filter_map(|v| non_blank(v))
        .map(|v| el("div").text(v))
        .chain(
            [&info.linkedin, &info.website]
                .into_iter()
                .filter_map(|v| non_blank(v))
                .map(|v| link(v, "text-white hover:underline")),
        );

    let header = el("header")
        .page_header()
        .class("flex flex-col sm:flex-row items-center justify-between bg-teal-600 text-white p-8 -mx-10 -mt-10 mb-8")
        .child(el("div").child_opt(non_blank(&info.name).map(|name| {
            el("h1")
                .class("text-4xl sm:text-5xl font-extrabold tracking-tight")
                .text(name)
        })))
        .child(el("div").class("text-right text-sm space-y-1 mt-4 sm:mt-0").children(contact));

    let has_lower = !data.education.is_empty() || skill_list(data).is_some();

    el("div")
        .class("p-10 font-sans text-gray-800 w-full")
        .child(header)
        .child(
            el("main")
                .class("space-y-10")
                .child_opt(non_blank(&data.summary).map(|summary| {
                    el("section").child(
                        el("p")
                            .atomic("summary")
                            .class("text-center text-lg text-gray-600 italic border-y-2 border-teal-100 py-4")
                            .text(summary),
                    )
                }))
                .child_opt((!data.experience.is_empty()).then(|| {
                    el("section")
                        .child(el("h2").class(CREATIVE_H2).text("Experience"))
                        .children(data.experience.iter().map(creative_company))
                }))
                .child_opt(has_lower.then(|| {
                    el("div")
                        .class("grid grid-cols-1 md:grid-cols-2 gap-10")
                        .child_opt((!data.education.is_empty()).then(|| {
                            el("section")
                                .child(el("h2").class(CREATIVE_H2).text("Education"))
                                .children(data.education.iter().map(|edu| {
                                    el("div")
                                        .atomic("education")
                                        .class("mb-4 break-inside-avoid")
                                        .child(el("h3").class("text-xl font-semibold text-gray-900").text(&edu.degree))
                                        .child(el("p").class("text-md italic text-gray-600").text(&edu.school))
                                        .child(
                                            el("p")
                                                .class("text-sm font-medium text-gray-500")
                                                .text(&edu.graduation_date),
                                        )
                                }))
                        }))
                        .child_opt(skill_list(data).map(|skills| {
                            el("section")
                                .child(el("h2").class(CREATIVE_H2).text("Skills"))
                                .child(
                                    el("div")
                                        .atomic("skills")
                                        .class("flex flex-wrap gap-3")
                                        .children(skills.into_iter().map(|skill| {
                                            el("span")
                                                .class("bg-teal-100 text-teal-800 text-sm font-semibold px-4 py-1 rounded")
                                                .text(skill)
                                        })),
                                )
                        }))
                })),
        )
}

fn creative_company(company: &CompanyExperience) -> El {
    el("div")
        .atomic("experience")
        .class("mb-6 relative pl-8 break-inside-avoid")
        .child(
            el("div")
                .class("flex justify-between items-baseline mb-1")
                .child(el("h3").class("text-xl font-semibold text-gray-900").text(&company.company))
                .child(el("p").class("text-md italic text-gray-600").text(&company.location)),
        )
        .children(company.positions.iter().map(|pos| {
            el("div")
                .atomic("position")
                .class("mt-2")
                .child(
                    el("div")
                        .class("flex justify-between items-baseline")
                        .child(el("h4").class("text-lg font-semibold text-gray-800").text(&pos.job_title))
                        .child(
                            el("p")
                                .class("text-sm font-medium text-gray-500")
                                .text(&dates(&pos.start_date, &pos.end_date)),
                        ),
                )
                .child(render_description(&pos.description, "mt-1"))
        }))
}
