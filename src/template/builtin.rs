//! Built-in template bodies, one per document category.

use crate::types::DocumentCategory;

const PROPOSAL: &str = r#"# Project Proposal{{#client_name}} for {{client_name}}{{/client_name}}

## Executive Summary
Based on your requirements, I'm pleased to present this comprehensive proposal for your project.

## Project Scope
{{project_details}}

## Deliverables
• Custom design mockups and prototypes
• Fully responsive implementation
• Cross-browser compatibility testing
• Documentation and training

## Timeline
- **Phase 1**: Discovery & Planning (1 week)
- **Phase 2**: Design & Development (3-4 weeks)
- **Phase 3**: Testing & Launch (1 week)

## Investment
The total investment for this project is **$4,500 - $6,000** depending on final requirements.

## Next Steps
1. Review this proposal
2. Schedule a follow-up call
3. Sign agreement and begin work

I look forward to working with you on this exciting project!"#;

const EMAIL: &str = r#"Subject: Following Up on Our Recent Discussion

Dear {{client_name}},

I hope this message finds you well. I wanted to follow up on our recent conversation regarding your project.

{{project_details}}

I'm excited about the opportunity to collaborate with you on this initiative. If you have any questions or would like to discuss further details, please don't hesitate to reach out.

Looking forward to hearing from you soon.

Best regards,
[Your Name]"#;

const ESTIMATE: &str = r#"# Project Estimate{{#client_name}} - {{client_name}}{{/client_name}}

## Project Overview
{{project_details}}

## Cost Breakdown

| Item | Description | Cost |
|------|-------------|------|
| Design | UI/UX design and prototyping | $1,500 |
| Development | Frontend + Backend implementation | $3,500 |
| Testing | QA and bug fixes | $500 |
| Project Management | Coordination and communication | $500 |

## Total Estimate: **$6,000**

## Payment Terms
- 30% upfront deposit
- 40% upon design approval
- 30% upon project completion

## Validity
This estimate is valid for 30 days from the date of issue.

*Note: Final costs may vary based on specific requirements and scope changes.*"#;

pub fn body_for(category: DocumentCategory) -> &'static str {
    match category {
        DocumentCategory::Proposal => PROPOSAL,
        DocumentCategory::Email => EMAIL,
        DocumentCategory::Estimate => ESTIMATE,
    }
}
